use crate::models::{BatchSummary, Prediction};
use crate::utils::safe_rate;

/// Summarise a batch of predictions. Total over any length; an empty batch
/// yields all zeros.
pub fn aggregate(predictions: &[Prediction]) -> BatchSummary {
    let count = predictions.len();
    let positive_count = predictions.iter().filter(|p| p.label == 1).count();

    BatchSummary {
        count,
        positive_count,
        positive_rate: safe_rate(positive_count, count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(probability: f64) -> Prediction {
        Prediction {
            identifier: format!("O{}", (probability * 100.0) as u32),
            probability,
            label: u8::from(probability >= 0.5),
        }
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(
            aggregate(&[]),
            BatchSummary {
                count: 0,
                positive_count: 0,
                positive_rate: 0.0,
            }
        );
    }

    #[test]
    fn test_two_of_three_late() {
        let summary = aggregate(&[prediction(0.91), prediction(0.12), prediction(0.5)]);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.positive_count, 2);
        assert!((summary.positive_rate - 0.667).abs() < 1e-3);
    }

    #[test]
    fn test_all_on_time() {
        let summary = aggregate(&[prediction(0.2), prediction(0.3)]);
        assert_eq!(summary.positive_count, 0);
        assert_eq!(summary.positive_rate, 0.0);
    }
}
