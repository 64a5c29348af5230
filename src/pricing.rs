//! Pricing

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::CartLine;

/// Errors that can occur while calculating a cart total.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// No lines were provided, so currency could not be determined.
    #[error("no cart lines provided; cannot determine currency")]
    NoLines,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Sums the subtotals of a list of cart lines.
///
/// # Errors
///
/// - [`TotalPriceError::NoLines`]: No lines were provided, so currency could not be determined.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(lines: &[CartLine<'a>]) -> Result<Money<'a, Currency>, TotalPriceError> {
    let first = lines.first().ok_or(TotalPriceError::NoLines)?;

    let total = lines.iter().try_fold(
        Money::from_minor(0, first.subtotal().currency()),
        |acc, line| acc.add(*line.subtotal()),
    )?;

    Ok(total)
}

/// Multiplies a unit price by a quantity in minor units.
///
/// Returns `None` when the product does not fit in an `i64`.
pub fn extend_price<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
) -> Option<Money<'a, Currency>> {
    unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, unit_price.currency()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{KRW, USD};
    use testresult::TestResult;

    use crate::ids::ProductId;

    use super::*;

    #[test]
    fn total_price_sums_line_subtotals() -> TestResult {
        let lines = [
            CartLine::new(ProductId(1), "Americano", Money::from_minor(4_500, KRW), 2)?,
            CartLine::new(ProductId(2), "Latte", Money::from_minor(5_000, KRW), 1)?,
        ];

        assert_eq!(total_price(&lines)?, Money::from_minor(14_000, KRW));

        Ok(())
    }

    #[test]
    fn total_price_empty() {
        let lines: [CartLine<'static>; 0] = [];

        assert!(matches!(total_price(&lines), Err(TotalPriceError::NoLines)));
    }

    #[test]
    fn total_price_rejects_mixed_currencies() -> TestResult {
        let lines = [
            CartLine::new(ProductId(1), "Americano", Money::from_minor(4_500, KRW), 1)?,
            CartLine::new(ProductId(2), "Cold brew", Money::from_minor(450, USD), 1)?,
        ];

        assert!(matches!(total_price(&lines), Err(TotalPriceError::Money(_))));

        Ok(())
    }

    #[test]
    fn extend_price_multiplies_by_quantity() {
        let extended = extend_price(&Money::from_minor(3_200, KRW), 3);

        assert_eq!(extended, Some(Money::from_minor(9_600, KRW)));
    }

    #[test]
    fn extend_price_detects_overflow() {
        let extended = extend_price(&Money::from_minor(i64::MAX, KRW), 2);

        assert!(extended.is_none());
    }
}
