use nnhs::{load_model, InferenceEngine, InferenceConfig, RangeValidator};

/// Evaluates a 2-input net over a 51 x 51 grid spanning [-4, 4] and reports
/// how often each input left its training range.
///
///   cargo run --example grid -- path/to/model.net
fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/two_two_one.net").to_string());

    let model = load_model(&path)?;
    println!("{model}");
    for line in model.info() {
        println!("  {line}");
    }
    anyhow::ensure!(model.num_inputs() == 2, "grid demo needs a 2-input net, got {}", model.topology());

    let engine = InferenceEngine::new(&InferenceConfig::default());
    let mut validator = RangeValidator::new(&model);
    let axis: Vec<f64> = (0..51).map(|i| -4.0 + 0.16 * i as f64).collect();

    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &y in &axis {
        for &x in &axis {
            let inp = [x, y];
            let z = engine.forward(&model, &inp)?[0];
            validator.check(&inp)?;
            lo = lo.min(z);
            hi = hi.max(z);
        }
    }

    println!("output range over grid: [{lo:.6}, {hi:.6}]");
    for row in validator.counters().report(&model) {
        println!(
            "{} out of range [{}, {}] for {} of {} samples",
            row.variable,
            row.min,
            row.max,
            row.count,
            axis.len() * axis.len()
        );
    }
    Ok(())
}
