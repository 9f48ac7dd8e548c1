use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use solar_savings_core::projection::{
    project, FinancingTerms, PaymentMode, ProjectionInput, RegionPolicy,
};
use solar_savings_core::reference::PANEL_DEGRADATION_RATE;
use solar_savings_core::time_value::compound;
use solar_savings_core::SolarError;

fn arizona_upfront() -> ProjectionInput {
    ProjectionInput {
        system_kw: dec!(5),
        region: "AZ".into(),
        site_efficiency_index: 2,
        payment: PaymentMode::Upfront,
        current_kwh_cost: dec!(0.15),
        annual_increase_pct: dec!(3),
        incentive: Decimal::ZERO,
        region_policy: RegionPolicy::Fallback,
        discount_rate_pct: None,
    }
}

fn financed(down_payment: Decimal, interest_rate_pct: Decimal, repayment_years: u32) -> ProjectionInput {
    ProjectionInput {
        payment: PaymentMode::Financing(FinancingTerms {
            down_payment,
            interest_rate_pct,
            repayment_years,
        }),
        ..arizona_upfront()
    }
}

fn assert_invalid(result: Result<impl std::fmt::Debug, SolarError>, expected_field: &str) {
    match result {
        Err(SolarError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
        other => panic!("expected InvalidInput on {expected_field}, got {other:?}"),
    }
}

// ===========================================================================
// Shape and invariants
// ===========================================================================

#[test]
fn test_projection_has_25_ordered_years() {
    let out = project(&arizona_upfront()).unwrap().result;
    assert_eq!(out.rows.len(), 25);
    let years: Vec<u32> = out.rows.iter().map(|r| r.year).collect();
    assert_eq!(years, (1..=25).collect::<Vec<u32>>());
}

#[test]
fn test_cumulative_is_running_sum_of_net() {
    for input in [arizona_upfront(), financed(dec!(2000), dec!(7.25), 12)] {
        let out = project(&input).unwrap().result;
        let mut previous = Decimal::ZERO;
        for row in &out.rows {
            assert_eq!(row.cumulative, previous + row.net, "year {}", row.year);
            previous = row.cumulative;
        }
        assert_eq!(out.summary.total_savings, previous);
    }
}

#[test]
fn test_net_is_value_minus_payment_plus_incentive() {
    let mut input = financed(dec!(1000), dec!(5), 10);
    input.incentive = dec!(2500);
    let out = project(&input).unwrap().result;
    for row in &out.rows {
        assert_eq!(row.net, row.energy_value - row.payment + row.incentive);
    }
}

#[test]
fn test_yield_degrades_every_year() {
    let out = project(&arizona_upfront()).unwrap().result;
    for pair in out.rows.windows(2) {
        assert!(pair[1].energy_kwh < pair[0].energy_kwh);
    }
    let expected_y25 = dec!(9000) * compound(-PANEL_DEGRADATION_RATE, 24).unwrap();
    assert!((out.rows[24].energy_kwh - expected_y25).abs() < dec!(0.000001));
}

#[test]
fn test_price_escalates_every_year() {
    let out = project(&arizona_upfront()).unwrap().result;
    assert_eq!(out.rows[0].utility_price, dec!(0.15));
    assert_eq!(out.rows[1].utility_price, dec!(0.1545));
    for pair in out.rows.windows(2) {
        assert!(pair[1].utility_price > pair[0].utility_price);
    }
}

#[test]
fn test_zero_escalation_keeps_price_flat() {
    let mut input = arizona_upfront();
    input.annual_increase_pct = Decimal::ZERO;
    let out = project(&input).unwrap().result;
    assert!(out.rows.iter().all(|r| r.utility_price == dec!(0.15)));
}

#[test]
fn test_projection_is_idempotent() {
    let input = financed(dec!(500), dec!(4.9), 15);
    let a = project(&input).unwrap().result;
    let b = project(&input).unwrap().result;
    assert_eq!(a, b);
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_scenario_a_upfront_arizona() {
    let out = project(&arizona_upfront()).unwrap();
    let y1 = &out.result.rows[0];
    // 5 kW * 1800 * 1.00 * 1.0 * 0.15 - 5 * 3000
    assert_eq!(y1.net, dec!(-13650));
    assert_eq!(y1.cumulative, dec!(-13650));
    assert!(!out.result.region.fallback);
    assert_eq!(out.result.region.name.as_deref(), Some("Arizona"));
    assert!(out.warnings.is_empty(), "warnings: {:?}", out.warnings);
}

#[test]
fn test_scenario_b_zero_interest_financing() {
    let out = project(&financed(Decimal::ZERO, Decimal::ZERO, 10)).unwrap().result;
    let loan = out.summary.financing.as_ref().unwrap();
    assert_eq!(loan.monthly_payment, dec!(125));
    assert_eq!(out.rows[0].payment, dec!(1500));
    assert_eq!(out.rows[0].net, dec!(-150));
    assert_eq!(out.rows[9].payment, dec!(1500));
    assert_eq!(out.rows[10].payment, Decimal::ZERO);
    assert_eq!(out.summary.total_payments, dec!(15000));
}

#[test]
fn test_scenario_c_unknown_region_falls_back() {
    let mut input = arizona_upfront();
    input.region = "ZZ".into();
    let out = project(&input).unwrap();
    assert!(out.result.region.fallback);
    assert_eq!(out.result.region.productivity_factor, dec!(0.30));
    assert_eq!(out.result.region.name, None);
    // 5 * 1800 * 0.30
    assert_eq!(out.result.rows[0].energy_kwh, dec!(2700));
    assert!(out.warnings.iter().any(|w| w.contains("Unknown region 'ZZ'")));
}

#[test]
fn test_strict_region_policy_rejects_unknown_code() {
    let mut input = arizona_upfront();
    input.region = "ZZ".into();
    input.region_policy = RegionPolicy::Strict;
    assert_invalid(project(&input), "region");
}

#[test]
fn test_strict_region_policy_accepts_known_code() {
    let mut input = arizona_upfront();
    input.region = "ny".into();
    input.region_policy = RegionPolicy::Strict;
    let out = project(&input).unwrap().result;
    assert_eq!(out.region.productivity_factor, dec!(0.68));
}

// ===========================================================================
// Financing
// ===========================================================================

#[test]
fn test_amortized_payment_satisfies_annuity_identity() {
    let out = project(&financed(dec!(2500), dec!(6.99), 20)).unwrap().result;
    let loan = out.summary.financing.unwrap();
    let r = loan.monthly_rate;
    let pv = loan.monthly_payment * (Decimal::ONE - Decimal::ONE / compound(r, loan.term_months).unwrap()) / r;
    let rel = ((pv - loan.principal) / loan.principal).abs();
    assert!(rel < dec!(0.000001), "relative error {rel}");
    assert_eq!(loan.principal, dec!(12500));
}

#[test]
fn test_loan_longer_than_horizon_charges_every_year() {
    let out = project(&financed(Decimal::ZERO, dec!(5), 30)).unwrap();
    let loan = out.result.summary.financing.as_ref().unwrap();
    assert!(out.result.rows.iter().all(|r| r.payment == loan.annual_payment));
    assert!(loan.balance_after_horizon > Decimal::ZERO);
    assert!(out.warnings.iter().any(|w| w.contains("still owed after year 25")));
}

#[test]
fn test_zero_repayment_term_rejected() {
    assert_invalid(project(&financed(Decimal::ZERO, dec!(5), 0)), "repayment_years");
}

#[test]
fn test_down_payment_above_cost_warns() {
    let out = project(&financed(dec!(20000), dec!(5), 10)).unwrap();
    let loan = out.result.summary.financing.as_ref().unwrap();
    assert_eq!(loan.principal, Decimal::ZERO);
    assert_eq!(out.result.rows[0].payment, dec!(20000));
    assert!(out.warnings.iter().any(|w| w.contains("exceeds system cost")));
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_invalid_inputs_rejected() {
    let mut input = arizona_upfront();
    input.system_kw = Decimal::ZERO;
    assert_invalid(project(&input), "system_kw");

    let mut input = arizona_upfront();
    input.site_efficiency_index = 5;
    assert_invalid(project(&input), "site_efficiency_index");

    let mut input = arizona_upfront();
    input.current_kwh_cost = dec!(-0.10);
    assert_invalid(project(&input), "current_kwh_cost");

    let mut input = arizona_upfront();
    input.current_kwh_cost = Decimal::ZERO;
    assert_invalid(project(&input), "current_kwh_cost");

    let mut input = arizona_upfront();
    input.annual_increase_pct = dec!(-1);
    assert_invalid(project(&input), "annual_increase_pct");

    let mut input = arizona_upfront();
    input.incentive = dec!(-500);
    assert_invalid(project(&input), "incentive");

    let mut input = arizona_upfront();
    input.discount_rate_pct = Some(dec!(-100));
    assert_invalid(project(&input), "discount_rate_pct");

    assert_invalid(project(&financed(dec!(-1), dec!(5), 10)), "down_payment");
    assert_invalid(project(&financed(Decimal::ZERO, dec!(-0.5), 10)), "interest_rate_pct");
}

// ===========================================================================
// Out-of-range arithmetic
// ===========================================================================

fn assert_overflow(input: &ProjectionInput) {
    match project(input) {
        Err(SolarError::Overflow { .. }) => {}
        other => panic!("expected Overflow, got {other:?}"),
    }
}

#[test]
fn test_runaway_escalation_is_an_error() {
    let mut input = arizona_upfront();
    input.annual_increase_pct = dec!(10000);
    assert_overflow(&input);
}

#[test]
fn test_runaway_interest_is_an_error() {
    assert_overflow(&financed(Decimal::ZERO, dec!(1000), 10));
}

#[test]
fn test_oversized_system_is_an_error() {
    let mut input = arizona_upfront();
    input.system_kw = dec!(100000000000000000000000000);
    assert_overflow(&input);
}

#[test]
fn test_loan_term_beyond_limit_rejected() {
    assert_invalid(project(&financed(Decimal::ZERO, dec!(6), 2000)), "repayment_years");
    assert_invalid(
        project(&financed(Decimal::ZERO, dec!(6), u32::MAX)),
        "repayment_years",
    );
}

// ===========================================================================
// Summary
// ===========================================================================

#[test]
fn test_upfront_arizona_pays_back_and_has_positive_irr() {
    let out = project(&arizona_upfront()).unwrap().result;
    let s = &out.summary;
    assert_eq!(s.system_cost, dec!(15000));
    assert!(s.total_savings > Decimal::ZERO);
    // Year 1 nets ~1350 of energy; escalation makes recovery take about a decade.
    let payback = s.payback_year.unwrap();
    assert!((8..=12).contains(&payback), "payback year {payback}");
    let before = &out.rows[(payback - 2) as usize];
    assert!(before.cumulative < Decimal::ZERO);
    let irr = s.irr.unwrap();
    assert!(irr > dec!(0.05) && irr < dec!(0.15), "irr={irr}");
}

#[test]
fn test_npv_only_when_discount_rate_given() {
    let plain = project(&arizona_upfront()).unwrap().result;
    assert_eq!(plain.summary.npv, None);

    let mut input = arizona_upfront();
    input.discount_rate_pct = Some(Decimal::ZERO);
    let undiscounted = project(&input).unwrap().result.summary;
    assert_eq!(undiscounted.npv, Some(undiscounted.total_savings));

    // Discounting at the project's own IRR brings the NPV to about zero.
    let irr = undiscounted.irr.unwrap();
    input.discount_rate_pct = Some(irr * dec!(100));
    let at_irr = project(&input).unwrap().result.summary.npv.unwrap();
    assert!(at_irr.abs() < dec!(1), "npv at irr = {at_irr}");
}

#[test]
fn test_poor_site_never_pays_back() {
    let mut input = arizona_upfront();
    input.region = "WA".into();
    input.site_efficiency_index = 0;
    input.current_kwh_cost = dec!(0.05);
    input.annual_increase_pct = Decimal::ZERO;
    let out = project(&input).unwrap().result;
    assert!(out.summary.total_savings < Decimal::ZERO);
    assert_eq!(out.summary.payback_year, None);
}

#[test]
fn test_output_serializes_with_payment_tag() {
    let input: ProjectionInput = serde_json::from_str(
        r#"{
            "system_kw": 6,
            "region": "CA",
            "payment": {"mode": "financing", "down_payment": 1000, "interest_rate_pct": 4.5, "repayment_years": 10},
            "current_kwh_cost": "0.30",
            "annual_increase_pct": 2.5
        }"#,
    )
    .unwrap();
    assert_eq!(input.site_efficiency_index, 2);
    assert_eq!(input.incentive, Decimal::ZERO);
    assert_eq!(input.region_policy, RegionPolicy::Fallback);

    let out = project(&input).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["rows"].as_array().map(|r| r.len()), Some(25));
    assert_eq!(json["result"]["region"]["name"], "California");
}
