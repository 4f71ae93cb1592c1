use crate::types::Signals;

/// Build the human-readable explanation for a recommendation.
///
/// Lines are appended in fixed order (inventory, ads, returns, competitor),
/// skipping whichever did not apply. When nothing applied a single fallback
/// line is emitted, so the result is never empty.
pub fn build(signals: &Signals, has_competitor_price: bool) -> Vec<String> {
    let mut reasons = Vec::new();

    if signals.inventory > 0.0 {
        reasons.push("Low inventory → price increased slightly".to_string());
    } else if signals.inventory < 0.0 {
        reasons.push("High inventory → price reduced slightly".to_string());
    }

    if signals.ads > 0.0 {
        reasons.push("High ACOS → price increased to protect margin".to_string());
    } else if signals.ads < 0.0 {
        reasons.push("Efficient ads → price optimized for volume".to_string());
    }

    if signals.return_risk > 0.0 {
        reasons.push("High returns → risk-adjusted pricing".to_string());
    }

    if has_competitor_price {
        reasons.push("Price aligned with competitor market".to_string());
    }

    if reasons.is_empty() {
        reasons.push("Price optimized to reach target margin safely".to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(inventory: f64, ads: f64, return_risk: f64) -> Signals {
        Signals { inventory, ads, return_risk }
    }

    #[test]
    fn all_lines_in_fixed_order() {
        let reasons = build(&signals(0.05, 0.05, 0.05), true);
        assert_eq!(
            reasons,
            vec![
                "Low inventory → price increased slightly",
                "High ACOS → price increased to protect margin",
                "High returns → risk-adjusted pricing",
                "Price aligned with competitor market",
            ]
        );
    }

    #[test]
    fn negative_signals_use_their_own_wording() {
        let reasons = build(&signals(-0.05, -0.05, 0.0), false);
        assert_eq!(
            reasons,
            vec![
                "High inventory → price reduced slightly",
                "Efficient ads → price optimized for volume",
            ]
        );
    }

    #[test]
    fn fallback_when_nothing_fired() {
        let reasons = build(&signals(0.0, 0.0, 0.0), false);
        assert_eq!(reasons, vec!["Price optimized to reach target margin safely"]);
    }

    #[test]
    fn competitor_line_alone_suppresses_fallback() {
        let reasons = build(&signals(0.0, 0.0, 0.0), true);
        assert_eq!(reasons, vec!["Price aligned with competitor market"]);
    }
}
