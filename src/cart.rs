//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    ids::{ProductId, VendorId},
    pricing::{TotalPriceError, extend_price, total_price},
};

/// Errors related to cart construction or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// Unit price multiplied by quantity does not fit in minor units.
    #[error("line subtotal for product {0} overflowed")]
    SubtotalOverflow(ProductId),

    /// Unit price is negative.
    #[error("product {0} has a negative unit price")]
    NegativePrice(ProductId),

    /// Errors bubbled up from total price calculation.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// A single line of a cart snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    product: ProductId,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    subtotal: Money<'a, Currency>,
}

impl<'a> CartLine<'a> {
    /// Creates a line, computing its subtotal from unit price and quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NegativePrice`] for a negative unit price and
    /// [`CartError::SubtotalOverflow`] when the subtotal cannot be represented.
    pub fn new(
        product: ProductId,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Self, CartError> {
        if unit_price.to_minor_units() < 0 {
            return Err(CartError::NegativePrice(product));
        }

        let subtotal =
            extend_price(&unit_price, quantity).ok_or(CartError::SubtotalOverflow(product))?;

        Ok(Self {
            product,
            name: name.into(),
            unit_price,
            quantity,
            subtotal,
        })
    }

    /// Product on this line
    pub fn product(&self) -> ProductId {
        self.product
    }

    /// Product display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of a single unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }
}

/// Server-confirmed snapshot of a customer's cart at a single vendor.
///
/// Snapshots are never mutated locally; a cart change produces a new snapshot.
#[derive(Clone, Debug)]
pub struct CartSnapshot<'a> {
    vendor: VendorId,
    lines: Vec<CartLine<'a>>,
    total: Money<'a, Currency>,
    currency: &'static Currency,
}

impl<'a> CartSnapshot<'a> {
    /// Create an empty cart for the given vendor.
    pub fn new(vendor: VendorId, currency: &'static Currency) -> Self {
        CartSnapshot {
            vendor,
            lines: Vec::new(),
            total: Money::from_minor(0, currency),
            currency,
        }
    }

    /// Create a cart with the given lines, summing their subtotals.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line is in another currency or the total
    /// cannot be computed.
    pub fn with_lines(
        vendor: VendorId,
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.subtotal().currency();
            if line_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        let total = if lines.is_empty() {
            Money::from_minor(0, currency)
        } else {
            total_price(&lines)?
        };

        Ok(CartSnapshot {
            vendor,
            lines,
            total,
            currency,
        })
    }

    /// Vendor the cart is ordering from.
    pub fn vendor(&self) -> VendorId {
        self.vendor
    }

    /// Lines in the order the server returned them.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Sum of all line subtotals.
    pub fn total_amount(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
