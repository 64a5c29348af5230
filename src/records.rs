//! Records
//!
//! Wire shapes of the payloads exchanged with the order, policy and session
//! services, and their conversion into domain values. Amounts travel as
//! integer minor units alongside an ISO currency code.

use jiff::civil::Date;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{CartError, CartLine, CartSnapshot},
    customers::{Customer, MembershipTier},
    ids::{CustomerId, PolicyId, ProductId, VendorId},
    policies::{DiscountKind, DiscountPolicy, PolicyError, PolicyStatus},
};

/// Errors converting records into domain values.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A line's subtotal disagrees with unit price times quantity.
    #[error("line {index} subtotal is {reported}, expected {computed}")]
    LineSubtotalMismatch {
        /// Position of the line in the record
        index: usize,

        /// Subtotal sent by the server
        reported: i64,

        /// Unit price times quantity
        computed: i64,
    },

    /// The cart total disagrees with the sum of line subtotals.
    #[error("cart total is {reported}, expected {computed}")]
    TotalMismatch {
        /// Total sent by the server
        reported: i64,

        /// Sum of line subtotals
        computed: i64,
    },

    /// A fixed discount amount is not a whole number of minor units.
    #[error("fixed discount {0} is not a whole number of minor units")]
    FractionalAmount(Decimal),

    /// Invalid policy values.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Invalid cart values.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Look up a supported currency by its ISO code.
///
/// # Errors
///
/// Returns [`RecordError::UnknownCurrency`] for unsupported codes.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, RecordError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "KRW" => Ok(iso::KRW),
        "USD" => Ok(iso::USD),
        "GBP" => Ok(iso::GBP),
        "EUR" => Ok(iso::EUR),
        _ => Err(RecordError::UnknownCurrency(code.to_string())),
    }
}

/// Policy type tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKindRecord {
    /// `value` is percentage points
    Percent,

    /// `value` is an amount in minor units
    Fixed,
}

/// Policy status tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatusRecord {
    /// Selectable
    #[default]
    Available,

    /// Already consumed
    Used,

    /// Switched off by the backend
    Disabled,
}

/// Discount policy as supplied by the policy service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    /// Policy identifier
    pub id: PolicyId,

    /// Owning vendor
    pub vendor_id: VendorId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Percent or fixed
    #[serde(rename = "type")]
    pub kind: PolicyKindRecord,

    /// Percentage points or minor units
    pub value: Decimal,

    /// Minimum subtotal in minor units
    #[serde(default)]
    pub min_purchase: Option<i64>,

    /// Discount cap in minor units
    #[serde(default)]
    pub max_discount: Option<i64>,

    /// Minimum membership tier
    #[serde(default)]
    pub membership_limit: MembershipTier,

    /// Last valid day
    #[serde(default)]
    pub expiry: Option<Date>,

    /// Lifecycle state
    #[serde(default)]
    pub status: PolicyStatusRecord,

    /// Text shown when the policy is disabled
    #[serde(default)]
    pub disable_reason: Option<String>,
}

impl PolicyRecord {
    /// Convert into a policy priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the value or any amount is invalid.
    pub fn to_policy<'a>(&self, currency: &'a Currency) -> Result<DiscountPolicy<'a>, RecordError> {
        let kind = match self.kind {
            PolicyKindRecord::Percent => DiscountKind::percent_off(self.value)?,
            PolicyKindRecord::Fixed => {
                let minor = whole_minor_units(self.value)?;
                DiscountKind::amount_off(Money::from_minor(minor, currency))?
            }
        };

        let status = match self.status {
            PolicyStatusRecord::Available => PolicyStatus::Available,
            PolicyStatusRecord::Used => PolicyStatus::Used,
            PolicyStatusRecord::Disabled => PolicyStatus::Disabled(
                self.disable_reason
                    .clone()
                    .filter(|reason| !reason.trim().is_empty())
                    .unwrap_or_else(|| "currently unavailable".to_string()),
            ),
        };

        let mut policy = DiscountPolicy::new(self.id, self.vendor_id, self.name.clone(), kind)
            .with_membership_limit(self.membership_limit)
            .with_status(status);

        if let Some(minimum) = self.min_purchase {
            policy = policy.with_min_purchase(Money::from_minor(minimum, currency))?;
        }

        if let Some(cap) = self.max_discount {
            policy = policy.with_max_discount(Money::from_minor(cap, currency))?;
        }

        if let Some(expiry) = self.expiry {
            policy = policy.with_expiry(expiry);
        }

        Ok(policy)
    }
}

fn whole_minor_units(value: Decimal) -> Result<i64, RecordError> {
    if value.fract() != Decimal::ZERO {
        return Err(RecordError::FractionalAmount(value));
    }

    value.to_i64().ok_or(RecordError::FractionalAmount(value))
}

/// One cart line as returned by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRecord {
    /// Product identifier
    pub product_id: ProductId,

    /// Product display name
    #[serde(default)]
    pub name: String,

    /// Unit price in minor units
    pub unit_price: i64,

    /// Number of units
    pub quantity: u32,

    /// Server-computed line subtotal in minor units
    pub subtotal: i64,
}

/// Cart snapshot as returned by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Vendor the cart orders from
    pub vendor_id: VendorId,

    /// ISO currency code
    pub currency: String,

    /// Lines in server order
    #[serde(default)]
    pub items: Vec<CartLineRecord>,

    /// Server-computed total in minor units
    pub total_amount: i64,
}

impl TryFrom<&CartRecord> for CartSnapshot<'static> {
    type Error = RecordError;

    fn try_from(record: &CartRecord) -> Result<Self, Self::Error> {
        let currency = currency_from_code(&record.currency)?;

        let lines = record
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let line = CartLine::new(
                    item.product_id,
                    item.name.clone(),
                    Money::from_minor(item.unit_price, currency),
                    item.quantity,
                )?;

                let computed = line.subtotal().to_minor_units();
                if computed == item.subtotal {
                    Ok(line)
                } else {
                    Err(RecordError::LineSubtotalMismatch {
                        index,
                        reported: item.subtotal,
                        computed,
                    })
                }
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        let cart = CartSnapshot::with_lines(record.vendor_id, lines, currency)?;
        let computed = cart.total_amount().to_minor_units();

        if computed != record.total_amount {
            return Err(RecordError::TotalMismatch {
                reported: record.total_amount,
                computed,
            });
        }

        Ok(cart)
    }
}

/// Signed-in customer as held by the session service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    /// Customer identifier
    pub id: CustomerId,

    /// Membership tier
    #[serde(default)]
    pub membership: MembershipTier,

    /// Stored balance in minor units
    #[serde(default)]
    pub balance: i64,
}

impl CustomerRecord {
    /// Convert into a customer whose balance is held in `currency`.
    pub fn to_customer<'a>(&self, currency: &'a Currency) -> Customer<'a> {
        Customer::new(
            self.id,
            self.membership,
            Money::from_minor(self.balance, currency),
        )
    }
}
