use crate::error::{NnhsError, Result};
use crate::network::model::NetworkModel;
use crate::validate::counters::RangeCounters;

/// Counts features lying outside their input range into `counters`.
///
/// Bounds are inclusive: a feature equal to `min` or `max` is in range.
/// Out-of-range values are never an error; the return value is the number of
/// features counted for this sample. Only a feature vector or counter set of
/// the wrong length fails, and then nothing is counted.
pub fn check_range(model: &NetworkModel, features: &[f64], counters: &mut RangeCounters) -> Result<usize> {
    if features.len() != model.num_inputs() {
        return Err(NnhsError::DimensionMismatch {
            what: "input features",
            expected: model.num_inputs(),
            actual: features.len(),
        });
    }
    if counters.len() != model.num_inputs() {
        return Err(NnhsError::DimensionMismatch {
            what: "range counters",
            expected: model.num_inputs(),
            actual: counters.len(),
        });
    }

    let mut flagged = 0;
    for (i, (&x, range)) in features.iter().zip(model.input_range()).enumerate() {
        if x < range.min || x > range.max {
            counters.increment(i);
            flagged += 1;
        }
    }
    Ok(flagged)
}

/// Pairs a shared model with one set of counters, typically one per worker.
#[derive(Debug)]
pub struct RangeValidator<'m> {
    model: &'m NetworkModel,
    counters: RangeCounters,
}

impl<'m> RangeValidator<'m> {
    pub fn new(model: &'m NetworkModel) -> RangeValidator<'m> {
        RangeValidator { model, counters: RangeCounters::for_model(model) }
    }

    pub fn check(&mut self, features: &[f64]) -> Result<usize> {
        check_range(self.model, features, &mut self.counters)
    }

    pub fn counters(&self) -> &RangeCounters {
        &self.counters
    }

    pub fn reset(&mut self) {
        self.counters.reset();
    }

    pub fn into_counters(self) -> RangeCounters {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::dense::Layer;
    use crate::math::matrix::Matrix;
    use crate::network::metadata::Declaration;
    use crate::network::model::{ModelParts, Range};

    fn model() -> NetworkModel {
        NetworkModel::new(ModelParts {
            problem: "ranges".into(),
            inputs: vec![
                Declaration { name: "sza".into(), line: "input 1 is sza in [0,10]".into() },
                Declaration { name: "oza".into(), line: "input 2 is oza in [-5,5]".into() },
            ],
            input_range: vec![Range::new(0.0, 10.0), Range::new(-5.0, 5.0)],
            output_range: vec![Range::new(0.0, 1.0)],
            layer_sizes: vec![2, 1],
            layers: vec![Layer::new(Matrix::zeros(1, 2), vec![0.0]).unwrap()],
            ..ModelParts::default()
        })
        .unwrap()
    }

    #[test]
    fn above_max_counts_once_for_that_feature_only() {
        let m = model();
        let mut counters = RangeCounters::for_model(&m);
        assert_eq!(check_range(&m, &[15.0, 0.0], &mut counters).unwrap(), 1);
        assert_eq!(counters.as_slice(), [1, 0]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let m = model();
        let mut counters = RangeCounters::for_model(&m);
        check_range(&m, &[10.0, -5.0], &mut counters).unwrap();
        check_range(&m, &[0.0, 5.0], &mut counters).unwrap();
        assert_eq!(counters.total(), 0);
    }

    #[test]
    fn validator_accumulates_and_reports_names() {
        let m = model();
        let mut validator = RangeValidator::new(&m);
        validator.check(&[-1.0, 6.0]).unwrap();
        validator.check(&[-0.5, 0.0]).unwrap();
        let report = validator.counters().report(&m);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].variable, "sza");
        assert_eq!(report[0].count, 2);
        assert_eq!(report[1].variable, "oza");
        assert_eq!(report[1].count, 1);

        validator.reset();
        assert_eq!(validator.into_counters().total(), 0);
    }

    #[test]
    fn wrong_length_counts_nothing() {
        let m = model();
        let mut counters = RangeCounters::for_model(&m);
        assert!(check_range(&m, &[100.0], &mut counters).is_err());
        assert!(check_range(&m, &[100.0, 100.0], &mut RangeCounters::new(3)).is_err());
        assert_eq!(counters.total(), 0);
    }

    #[test]
    fn nan_is_not_counted() {
        let m = model();
        let mut counters = RangeCounters::for_model(&m);
        assert_eq!(check_range(&m, &[f64::NAN, 0.0], &mut counters).unwrap(), 0);
    }
}
