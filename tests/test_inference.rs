//! Integration test: forward inference properties

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nnhs::activation::activation::sigmoid;
use nnhs::{
    forward, load_model, parse_str, InferenceEngine, Layer, LoadConfig, Matrix, ModelParts, NetworkModel,
    NnhsError, Range, RangeKind,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

/// Fully connected net with weights drawn from `[-spread, spread]`.
fn random_model(rng: &mut StdRng, sizes: &[usize], spread: f64) -> NetworkModel {
    let layers = sizes
        .windows(2)
        .map(|pair| {
            let (src, dst) = (pair[0], pair[1]);
            let weights = Matrix::from_data(
                (0..dst)
                    .map(|_| (0..src).map(|_| rng.gen_range(-spread..spread)).collect())
                    .collect(),
            );
            let biases = (0..dst).map(|_| rng.gen_range(-spread..spread)).collect();
            Layer::new(weights, biases).unwrap()
        })
        .collect();
    NetworkModel::new(ModelParts {
        problem: "random".into(),
        input_range: (0..sizes[0]).map(|i| Range::new(-(i as f64) - 1.0, i as f64 + 2.0)).collect(),
        output_range: (0..sizes[sizes.len() - 1]).map(|_| Range::new(-3.0, 7.0)).collect(),
        layer_sizes: sizes.to_vec(),
        layers,
        ..ModelParts::default()
    })
    .unwrap()
}

#[test]
fn test_end_to_end_two_two_one() {
    let model = load_model(fixture("two_two_one.net")).unwrap();
    let engine = InferenceEngine::default();

    let planes = engine.activations(&model, &[0.0, 0.0]).unwrap();
    assert_eq!(planes[0], vec![0.5, 0.5]);

    let hidden = 1.0 / (1.0 + (-0.5f64).exp());
    assert!((planes[1][0] - hidden).abs() < 1e-12);
    assert!((planes[1][1] - hidden).abs() < 1e-12);

    // The output plane goes through the clamped sigmoid as well, then is
    // scaled by the (0, 1) output range.
    let expected = 1.0 / (1.0 + (-(hidden + hidden)).exp());
    let outputs = forward(&model, &[0.0, 0.0]).unwrap();
    assert_eq!(outputs.len(), 1);
    assert!((outputs[0] - expected).abs() < 1e-9, "{} vs {}", outputs[0], expected);
}

#[test]
fn test_normalization_boundaries_are_exact() {
    let model = load_model(fixture("three_layer.net")).unwrap();
    let mins: Vec<f64> = model.input_range().iter().map(|r| r.min).collect();
    let maxs: Vec<f64> = model.input_range().iter().map(|r| r.max).collect();

    assert_eq!(InferenceEngine::normalize(&model, &mins).unwrap(), vec![0.0; 3]);
    assert_eq!(InferenceEngine::normalize(&model, &maxs).unwrap(), vec![1.0; 3]);
}

#[test]
fn test_forward_is_deterministic() {
    let model = load_model(fixture("three_layer.net")).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let features: Vec<f64> = (0..3).map(|_| rng.gen_range(-100.0..100.0)).collect();
        let a = forward(&model, &features).unwrap();
        let b = forward(&model, &features).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }
}

#[test]
fn test_every_plane_stays_within_clamped_sigmoid_bounds() {
    let (lo, hi) = (sigmoid(-10.0), sigmoid(10.0));
    let mut rng = StdRng::seed_from_u64(7);
    let engine = InferenceEngine::default();

    for trial in 0..50 {
        let model = random_model(&mut rng, &[4, 6, 5, 3], 25.0);
        let features: Vec<f64> = (0..4).map(|_| rng.gen_range(-1e6..1e6)).collect();
        let planes = engine.activations(&model, &features).unwrap();
        for (k, plane) in planes.iter().enumerate().skip(1) {
            for &a in plane {
                assert!(a >= lo && a <= hi, "trial {trial} plane {k}: {a}");
            }
        }
    }
}

#[test]
fn test_out_of_range_features_are_extrapolated() {
    let model = load_model(fixture("three_layer.net")).unwrap();
    let outputs = forward(&model, &[5.0, -20.0, 100.0]).unwrap();
    assert_eq!(outputs.len(), 2);
    assert!(outputs.iter().all(|x| x.is_finite()));
    for (y, r) in outputs.iter().zip(model.output_range()) {
        assert!(*y > r.min && *y < r.max);
    }
}

#[test]
fn test_degenerate_input_range_aborts_only_that_call() {
    let mut rng = StdRng::seed_from_u64(3);
    let healthy = random_model(&mut rng, &[2, 3, 1], 1.0);

    let mut parts: ModelParts = healthy.clone().into();
    parts.input_range[0] = Range::new(2.5, 2.5);
    let broken = NetworkModel::new(parts).unwrap();

    match forward(&broken, &[2.5, 0.0]) {
        Err(NnhsError::DegenerateRange { kind: RangeKind::Input, index: 0, .. }) => {}
        other => panic!("expected DegenerateRange, got {other:?}"),
    }
    assert!(forward(&healthy, &[2.5, 0.0]).is_ok());
}

#[test]
fn test_inverted_input_range_fails_after_lenient_load() {
    let text = std::fs::read_to_string(fixture("two_two_one.net"))
        .unwrap()
        .replacen("-1.000000 1.000000\n", "1.000000 -1.000000\n", 1);
    let lenient = LoadConfig::default().with_degenerate_ranges_allowed();
    let model = parse_str(&text, &lenient).unwrap();
    assert_eq!(model.input_range()[0], Range::new(1.0, -1.0));

    match forward(&model, &[0.25, 0.0]) {
        Err(NnhsError::DegenerateRange { kind: RangeKind::Input, index: 0, min, max }) => {
            assert_eq!((min, max), (1.0, -1.0));
        }
        other => panic!("expected DegenerateRange, got {other:?}"),
    }
}

#[test]
fn test_shared_model_across_threads() {
    let model = load_model(fixture("three_layer.net")).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let samples: Vec<Vec<f64>> = (0..400)
        .map(|_| vec![rng.gen_range(-6.0..1.0), rng.gen_range(-10.0..90.0), rng.gen_range(0.0..40.0)])
        .collect();

    let sequential: Vec<Vec<f64>> = samples.iter().map(|s| forward(&model, s).unwrap()).collect();

    let model = &model;
    let parallel: Vec<Vec<f64>> = std::thread::scope(|scope| {
        let handles: Vec<_> = samples
            .chunks(100)
            .map(|chunk| scope.spawn(move || chunk.iter().map(|s| forward(model, s).unwrap()).collect::<Vec<_>>()))
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(parallel, sequential);
}
