use crate::config::EngineConfig;
use crate::types::RiskLevel;

/// Classify the SKU's risk label. First matching rule wins:
///
/// 1. HIGH:   return-risk load above the cost fraction, or inefficient
///            ad spend (ACOS present and above `high_acos`)
/// 2. MEDIUM: known days of supply below `low_supply_days`
/// 3. LOW:    otherwise
///
/// This re-evaluates the raw observables directly instead of reusing the
/// adjustment signals: the label and the price adjustments are separate
/// rule sets that currently share thresholds, and each must be editable
/// without silently moving the other.
pub fn classify(
    days_of_supply: Option<f64>,
    acos_clicks_14d: Option<f64>,
    return_risk_load: f64,
    total_cost: f64,
    cfg: &EngineConfig,
) -> RiskLevel {
    let returns_risky = return_risk_load > cfg.risk_load_fraction * total_cost;
    let ads_risky = acos_clicks_14d.is_some_and(|acos| acos > cfg.high_acos);

    if returns_risky || ads_risky {
        RiskLevel::High
    } else if days_of_supply.is_some_and(|days| days < cfg.low_supply_days) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn heavy_returns_are_high() {
        // load 4.0 vs 0.2 * 15 = 3.0
        assert_eq!(classify(Some(50.0), None, 4.0, 15.0, &cfg()), RiskLevel::High);
    }

    #[test]
    fn inefficient_ads_are_high() {
        assert_eq!(classify(None, Some(50.0), 0.0, 15.0, &cfg()), RiskLevel::High);
    }

    #[test]
    fn high_acos_outranks_low_supply() {
        assert_eq!(
            classify(Some(5.0), Some(50.0), 0.0, 15.0, &cfg()),
            RiskLevel::High
        );
    }

    #[test]
    fn low_supply_is_medium() {
        assert_eq!(classify(Some(10.0), None, 0.0, 15.0, &cfg()), RiskLevel::Medium);
    }

    #[test]
    fn quiet_sku_is_low() {
        assert_eq!(
            classify(Some(45.0), Some(30.0), 0.5, 15.0, &cfg()),
            RiskLevel::Low
        );
    }

    #[test]
    fn absent_observables_are_low() {
        assert_eq!(classify(None, None, 0.0, 15.0, &cfg()), RiskLevel::Low);
    }

    #[test]
    fn acos_boundary_is_not_high() {
        assert_eq!(classify(None, Some(40.0), 0.0, 15.0, &cfg()), RiskLevel::Low);
    }

    #[test]
    fn supply_boundary_is_not_medium() {
        assert_eq!(classify(Some(20.0), None, 0.0, 15.0, &cfg()), RiskLevel::Low);
    }
}
