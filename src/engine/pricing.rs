use crate::config::{EngineConfig, DEFAULT_MIN_MARGIN_PCT, DEFAULT_TARGET_MARGIN_PCT};
use crate::engine::{rationale, risk, signals};
use crate::error::{AppError, Result};
use crate::types::{MetricsRow, Recommendation, Signals};

/// Produce a price recommendation from one metrics row.
///
/// Pure and synchronous: no I/O, no shared state, identical input yields a
/// bit-identical result. The caller is responsible for row selection: this
/// function assumes it receives the single representative (latest-dated) row
/// for the SKU.
pub fn recommend(row: &MetricsRow, cfg: &EngineConfig) -> Result<Recommendation> {
    let total_cost = row.cost.unwrap_or(0.0)
        + row.fba_fee.unwrap_or(0.0)
        + row.storage_fee.unwrap_or(0.0)
        + row.handling_cost.unwrap_or(0.0);

    let min_margin = margin_fraction(
        row.minimum_acceptable_margin_pct,
        DEFAULT_MIN_MARGIN_PCT,
        &row.sku,
    )?;
    let target_margin = margin_fraction(
        row.target_gross_margin_pct,
        DEFAULT_TARGET_MARGIN_PCT,
        &row.sku,
    )?;

    let min_price_allowed = total_cost / (1.0 - min_margin);
    let target_price = total_cost / (1.0 - target_margin);

    let current_price = row.current_price.unwrap_or(0.0);
    // Unset current price means no meaningful margin, not a division by zero.
    let current_margin = if current_price > 0.0 {
        (current_price - total_cost) / current_price
    } else {
        0.0
    };

    let units_shipped = row.units_shipped_t90.unwrap_or(0.0);
    let returns = row.returns_t90.unwrap_or(0.0);
    // +1 keeps the ratio defined (and bounded) when nothing shipped.
    let return_risk_load = (returns / (units_shipped + 1.0)) * total_cost;

    let sig = Signals {
        inventory: signals::inventory_signal(row.days_of_supply, cfg),
        ads: signals::ads_signal(row.acos_clicks_14d, cfg),
        return_risk: signals::return_risk_signal(return_risk_load, total_cost, cfg),
    };

    let competitor_target =
        signals::competitor_target(row.avg_competitor_price, current_price, cfg);

    // Signals compound multiplicatively in fixed order: inventory, ads, risk.
    let base = target_price.max(min_price_allowed);
    let price = base * (1.0 + sig.inventory) * (1.0 + sig.ads) * (1.0 + sig.return_risk);

    let blended = cfg.signal_blend_weight * price
        + (1.0 - cfg.signal_blend_weight) * competitor_target;
    // The minimum-margin floor is inviolable: competitor blending must never
    // drag the recommendation below it.
    let recommended_price = blended.max(min_price_allowed);

    let recommended_margin = (recommended_price - total_cost) / recommended_price;

    let risk_level = risk::classify(
        row.days_of_supply,
        row.acos_clicks_14d,
        return_risk_load,
        total_cost,
        cfg,
    );

    let rationale = rationale::build(&sig, row.avg_competitor_price.is_some());

    Ok(Recommendation {
        sku: row.sku.clone(),
        as_of: row.date,
        total_cost,
        min_margin,
        target_margin,
        min_price_allowed,
        target_price,
        current_price,
        current_margin,
        days_of_supply: row.days_of_supply,
        return_risk_load,
        signals: sig,
        competitor_target,
        recommended_price,
        recommended_margin,
        risk_level,
        rationale,
    })
}

/// Convert a margin percentage to a fraction, rejecting values at or above
/// 100%, which would zero or sign-invert the `1 - margin` denominator and
/// turn the price targets nonsensical.
fn margin_fraction(pct: Option<f64>, default_pct: f64, sku: &str) -> Result<f64> {
    let pct = pct.unwrap_or(default_pct);
    if pct >= 100.0 {
        return Err(AppError::MarginConfig {
            sku: sku.to_string(),
            pct,
        });
    }
    Ok(pct / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;
    use chrono::NaiveDate;

    fn base_row() -> MetricsRow {
        MetricsRow {
            sku: "SKU-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            cost: None,
            fba_fee: None,
            storage_fee: None,
            handling_cost: None,
            minimum_acceptable_margin_pct: None,
            target_gross_margin_pct: None,
            current_price: None,
            days_of_supply: None,
            avg_competitor_price: None,
            lowest_competitor_price: None,
            highest_competitor_price: None,
            units_shipped_t90: None,
            returns_t90: None,
            acos_clicks_14d: None,
            roas_clicks_14d: None,
            units_ordered: None,
        }
    }

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn worked_scenario() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.fba_fee = Some(3.0);
        row.storage_fee = Some(1.0);
        row.handling_cost = Some(1.0);
        row.days_of_supply = Some(15.0);
        row.acos_clicks_14d = Some(50.0);
        row.units_shipped_t90 = Some(100.0);
        row.returns_t90 = Some(5.0);
        row.avg_competitor_price = Some(22.0);
        row.current_price = Some(18.0);

        let rec = recommend(&row, &cfg()).unwrap();

        assert_eq!(rec.total_cost, 15.0);
        assert!((rec.min_price_allowed - 16.666_666_666_666_668).abs() < 1e-12);
        assert_eq!(rec.target_price, 20.0);
        assert_eq!(rec.signals.inventory, 0.05);
        assert_eq!(rec.signals.ads, 0.05);
        // 5 / 101 * 15 = 0.7426..., below 0.2 * 15
        assert!((rec.return_risk_load - 0.742_574_257_425_742_5).abs() < 1e-12);
        assert_eq!(rec.signals.return_risk, 0.0);
        assert!((rec.competitor_target - 20.8).abs() < 1e-9);
        // base 20, * 1.05 * 1.05 = 22.05, blended 0.6/0.4 with 20.8 = 21.55
        assert!((rec.recommended_price - 21.55).abs() < 1e-9);
        assert!(rec.recommended_price >= rec.min_price_allowed);
        assert!((rec.current_margin - (18.0 - 15.0) / 18.0).abs() < 1e-12);
        assert!((rec.recommended_margin - (21.55 - 15.0) / 21.55).abs() < 1e-9);
        assert_eq!(rec.risk_level, RiskLevel::High);
        assert_eq!(
            rec.rationale,
            vec![
                "Low inventory → price increased slightly",
                "High ACOS → price increased to protect margin",
                "Price aligned with competitor market",
            ]
        );
    }

    #[test]
    fn floor_holds_against_cheap_competitors() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.avg_competitor_price = Some(5.0);

        let rec = recommend(&row, &cfg()).unwrap();

        // Blend would land at 0.6 * 13.33 + 0.4 * 3.5 = 9.4, below the floor.
        assert_eq!(rec.recommended_price, rec.min_price_allowed);
        assert!((rec.min_price_allowed - 10.0 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn zero_cost_zeroes_the_price_targets() {
        let mut row = base_row();
        row.cost = Some(0.0);
        row.fba_fee = Some(0.0);
        row.storage_fee = Some(0.0);
        row.handling_cost = Some(0.0);
        row.current_price = Some(18.0);

        let rec = recommend(&row, &cfg()).unwrap();

        assert_eq!(rec.total_cost, 0.0);
        assert_eq!(rec.min_price_allowed, 0.0);
        assert_eq!(rec.target_price, 0.0);
    }

    #[test]
    fn unset_current_price_has_zero_margin() {
        let mut row = base_row();
        row.cost = Some(10.0);

        let rec = recommend(&row, &cfg()).unwrap();

        assert_eq!(rec.current_margin, 0.0);
        assert!(!rec.current_margin.is_nan());
    }

    #[test]
    fn identical_input_is_bit_identical() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.fba_fee = Some(3.0);
        row.days_of_supply = Some(15.0);
        row.acos_clicks_14d = Some(50.0);
        row.avg_competitor_price = Some(22.0);
        row.current_price = Some(18.0);

        let a = recommend(&row, &cfg()).unwrap();
        let b = recommend(&row, &cfg()).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            a.recommended_price.to_bits(),
            b.recommended_price.to_bits()
        );
        assert_eq!(
            a.recommended_margin.to_bits(),
            b.recommended_margin.to_bits()
        );
    }

    #[test]
    fn rationale_is_never_empty() {
        let rec = recommend(&base_row(), &cfg()).unwrap();
        assert_eq!(rec.rationale.len(), 1);
    }

    #[test]
    fn heavy_returns_dominate_without_other_observables() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.units_shipped_t90 = Some(10.0);
        row.returns_t90 = Some(9.0);

        let rec = recommend(&row, &cfg()).unwrap();

        // 9 / 11 * 10 = 8.18..., well above 0.2 * 10
        assert_eq!(rec.signals.return_risk, 0.05);
        assert_eq!(rec.signals.inventory, 0.0);
        assert_eq!(rec.signals.ads, 0.0);
        assert_eq!(rec.risk_level, RiskLevel::High);
        assert_eq!(rec.rationale, vec!["High returns → risk-adjusted pricing"]);
    }

    #[test]
    fn full_margin_is_rejected() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.target_gross_margin_pct = Some(100.0);

        let err = recommend(&row, &cfg()).unwrap_err();
        assert!(matches!(err, AppError::MarginConfig { pct, .. } if pct == 100.0));
    }

    #[test]
    fn full_minimum_margin_is_rejected_too() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.minimum_acceptable_margin_pct = Some(150.0);

        let err = recommend(&row, &cfg()).unwrap_err();
        assert!(matches!(err, AppError::MarginConfig { pct, .. } if pct == 150.0));
    }

    #[test]
    fn margins_default_to_ten_and_twenty_five_percent() {
        let mut row = base_row();
        row.cost = Some(10.0);

        let rec = recommend(&row, &cfg()).unwrap();

        assert_eq!(rec.min_margin, 0.10);
        assert_eq!(rec.target_margin, 0.25);
    }

    #[test]
    fn blend_weights_follow_injected_config() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.avg_competitor_price = Some(30.0);
        row.current_price = Some(20.0);

        let custom = EngineConfig {
            competitor_weight: 0.5,
            signal_blend_weight: 0.5,
            ..EngineConfig::default()
        };
        let rec = recommend(&row, &custom).unwrap();

        // competitor target 0.5 * 30 + 0.5 * 20 = 25; base 13.33 with no
        // signals; blended 0.5 * 13.33 + 0.5 * 25 = 19.1666...
        assert!((rec.competitor_target - 25.0).abs() < 1e-9);
        let base = 10.0 / 0.75;
        assert!((rec.recommended_price - (0.5 * base + 0.5 * 25.0)).abs() < 1e-9);
    }

    #[test]
    fn supply_thresholds_follow_injected_config() {
        let mut row = base_row();
        row.cost = Some(10.0);
        row.days_of_supply = Some(40.0);

        let custom = EngineConfig {
            low_supply_days: 45.0,
            ..EngineConfig::default()
        };
        let rec = recommend(&row, &custom).unwrap();

        assert_eq!(rec.signals.inventory, 0.05);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
    }
}
