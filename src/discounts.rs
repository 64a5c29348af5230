//! Discounts
//!
//! Final payable amount for a cart subtotal and an optional discount policy.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::policies::{DiscountKind, DiscountPolicy};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the amount a policy takes off `total`.
///
/// Percentages are truncated to whole minor units, so a discount never exceeds
/// the stated percentage. The result is capped by the policy's maximum
/// discount and by `total` itself. A policy whose minimum purchase is not met
/// takes nothing off.
///
/// # Errors
///
/// Returns an error if:
/// - a percentage calculation cannot be represented in minor units
///   (`DiscountError::PercentConversion`).
/// - a policy amount is in a different currency to `total` (`DiscountError::Money`).
pub fn discount_amount<'a>(
    total: &Money<'a, Currency>,
    policy: Option<&DiscountPolicy<'a>>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let currency = total.currency();
    let total_minor = total.to_minor_units();

    let Some(policy) = policy else {
        return Ok(Money::from_minor(0, currency));
    };

    if let Some(minimum) = policy.min_purchase() {
        ensure_same_currency(total, minimum)?;

        if total_minor < minimum.to_minor_units() {
            debug!(
                policy = %policy.id(),
                total = total_minor,
                minimum = minimum.to_minor_units(),
                "minimum purchase not met; policy ignored"
            );

            return Ok(Money::from_minor(0, currency));
        }
    }

    let raw_minor = match policy.kind() {
        DiscountKind::PercentOff(points) => percent_of_minor(*points, total_minor)?,
        DiscountKind::AmountOff(amount) => {
            ensure_same_currency(total, amount)?;
            amount.to_minor_units()
        }
    };

    let capped_minor = match policy.max_discount() {
        Some(cap) => {
            ensure_same_currency(total, cap)?;
            raw_minor.min(cap.to_minor_units())
        }
        None => raw_minor,
    };

    let discount_minor = capped_minor.clamp(0, total_minor.max(0));

    debug!(
        policy = %policy.id(),
        total = total_minor,
        raw = raw_minor,
        discount = discount_minor,
        "discount calculated"
    );

    Ok(Money::from_minor(discount_minor, currency))
}

/// Calculates the final payable amount for `total` with an optional policy.
///
/// The result is never negative and never exceeds `total`.
///
/// # Errors
///
/// See [`discount_amount`].
pub fn compute_final_amount<'a>(
    total: Money<'a, Currency>,
    policy: Option<&DiscountPolicy<'a>>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount = discount_amount(&total, policy)?;

    Ok(total.sub(discount)?)
}

/// Calculate `points` percent of a minor unit amount, truncated toward zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(points: Decimal, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    points
        .checked_mul(minor)
        .and_then(|applied| applied.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

fn ensure_same_currency(
    expected: &Money<'_, Currency>,
    actual: &Money<'_, Currency>,
) -> Result<(), MoneyError> {
    if expected.currency() == actual.currency() {
        Ok(())
    } else {
        Err(MoneyError::CurrencyMismatch {
            expected: expected.currency().iso_alpha_code,
            actual: actual.currency().iso_alpha_code,
        })
    }
}
