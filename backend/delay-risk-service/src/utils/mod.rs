// Utility functions for delay-risk-service

/// Round a probability to 4 decimals for display in API responses.
pub fn round_probability(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 10_000.0
}

/// Logistic function mapping a raw margin to a probability.
pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Ratio that treats an empty denominator as 1, so empty inputs yield 0.
pub fn safe_rate(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_probability() {
        assert_eq!(round_probability(0.123_456), 0.1235);
        assert_eq!(round_probability(1.0), 1.0);
        assert_eq!(round_probability(0.0), 0.0);
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_safe_rate() {
        assert_eq!(safe_rate(0, 0), 0.0);
        assert!((safe_rate(2, 3) - 0.666_666).abs() < 1e-3);
    }
}
