use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::SolarError;
use crate::types::{Money, Rate};
use crate::SolarResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 200;

/// Bracket searched by [`irr`]. Residential solar returns sit well inside it,
/// and the lower bound keeps discount factors far from decimal underflow.
const IRR_LOWER_BOUND: Rate = dec!(-0.5);
const IRR_UPPER_BOUND: Rate = dec!(1.0);

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Fails with `Overflow` when the factor leaves the decimal range.
pub fn compound(rate: Rate, n: u32) -> SolarResult<Decimal> {
    let overflow = || SolarError::overflow(format!("compounding {rate} over {n} periods"));
    let factor = Decimal::ONE.checked_add(rate).ok_or_else(overflow)?;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(factor).ok_or_else(overflow)?;
    }
    Ok(result)
}

/// 1 - (1 + r)^-n, the common term of the level-annuity formulas.
fn annuity_discount_term(rate: Rate, n: u32, context: &str) -> SolarResult<Decimal> {
    let factor = compound(rate, n)?;
    if factor.is_zero() {
        return Err(SolarError::DivisionByZero {
            context: format!("{context} compounding factor"),
        });
    }
    let discount = Decimal::ONE
        .checked_div(factor)
        .ok_or_else(|| SolarError::overflow(format!("{context} discount factor")))?;
    Ok(Decimal::ONE - discount)
}

/// Level payment that retires `principal` over `n` periods at `rate` per period.
///
/// PMT = P / n when r = 0, otherwise P * r / (1 - (1 + r)^-n).
pub fn annuity_payment(principal: Money, rate: Rate, n: u32) -> SolarResult<Money> {
    if n == 0 {
        return Err(SolarError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    let denom = annuity_discount_term(rate, n, "annuity payment")?;
    if denom.is_zero() {
        return Err(SolarError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|x| x.checked_div(denom))
        .ok_or_else(|| SolarError::overflow("annuity payment"))
}

/// Present value of a level annuity: PV = pmt * [(1 - (1+r)^-n) / r]
pub fn annuity_present_value(payment: Money, rate: Rate, n: u32) -> SolarResult<Money> {
    if rate.is_zero() || n == 0 {
        return payment
            .checked_mul(Decimal::from(n))
            .ok_or_else(|| SolarError::overflow("annuity present value"));
    }
    let term = annuity_discount_term(rate, n, "annuity present value")?;
    payment
        .checked_mul(term)
        .and_then(|x| x.checked_div(rate))
        .ok_or_else(|| SolarError::overflow("annuity present value"))
}

/// Net Present Value of a series of cash flows. The first flow is undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> SolarResult<Money> {
    if rate <= dec!(-1) {
        return Err(SolarError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    checked_npv(rate, cash_flows).ok_or_else(|| SolarError::DivisionByZero {
        context: format!("NPV discount factor at rate {rate}"),
    })
}

/// NPV that reports decimal overflow or a vanishing discount factor as `None`.
fn checked_npv(rate: Rate, cash_flows: &[Money]) -> Option<Money> {
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        if discount.is_zero() {
            return None;
        }
        result = result.checked_add(cf.checked_div(discount)?)?;
    }

    Some(result)
}

/// Internal Rate of Return by bisection over [-50%, 100%].
///
/// Requires at least one sign change in the flows and a sign change of NPV
/// across the bracket.
pub fn irr(cash_flows: &[Money]) -> SolarResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(SolarError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least 2 cash flows".into(),
        });
    }
    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    if !(has_negative && has_positive) {
        return Err(SolarError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR is undefined when cash flows never change sign".into(),
        });
    }

    let mut lo = IRR_LOWER_BOUND;
    let mut hi = IRR_UPPER_BOUND;
    let overflow = || SolarError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: 0,
        last_delta: Decimal::MAX,
    };
    let mut npv_lo = checked_npv(lo, cash_flows).ok_or_else(overflow)?;
    let npv_hi = checked_npv(hi, cash_flows).ok_or_else(overflow)?;

    if npv_lo.is_zero() {
        return Ok(lo);
    }
    if npv_hi.is_zero() {
        return Ok(hi);
    }
    if npv_lo.is_sign_negative() == npv_hi.is_sign_negative() {
        return Err(SolarError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: 0,
            last_delta: npv_hi,
        });
    }

    let mut last_delta = npv_hi;
    for i in 0..MAX_IRR_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let npv_mid = checked_npv(mid, cash_flows).ok_or(SolarError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: i,
            last_delta,
        })?;
        last_delta = npv_mid;

        if npv_mid.abs() < CONVERGENCE_THRESHOLD || (hi - lo) < CONVERGENCE_THRESHOLD {
            return Ok(mid);
        }

        if npv_mid.is_sign_negative() == npv_lo.is_sign_negative() {
            lo = mid;
            npv_lo = npv_mid;
        } else {
            hi = mid;
        }
    }

    Err(SolarError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta,
    })
}
