//! Discount Policies
//!
//! Discount rules offered by a vendor, together with the eligibility
//! constraints the storefront checks before letting a customer pick one.

use jiff::civil::{Date, Time};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    customers::MembershipTier,
    ids::{PolicyId, VendorId},
};

/// Errors raised when building a policy from invalid values.
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    /// Percentage points must lie in `[0, 100)`.
    #[error("percentage {0} is outside the range [0, 100)")]
    PercentOutOfRange(Decimal),

    /// Fixed discount amounts, minimums and caps must not be negative.
    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),
}

/// How a policy reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountKind<'a> {
    /// Take this many percentage points off the subtotal (e.g. "10% off").
    PercentOff(Decimal),

    /// Take a fixed amount off the subtotal (e.g. "₩2,000 off").
    AmountOff(Money<'a, Currency>),
}

impl<'a> DiscountKind<'a> {
    /// Percentage discount, validated to lie in `[0, 100)`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::PercentOutOfRange`] outside that range.
    pub fn percent_off(points: Decimal) -> Result<Self, PolicyError> {
        if points.is_sign_negative() || points >= Decimal::ONE_HUNDRED {
            return Err(PolicyError::PercentOutOfRange(points));
        }

        Ok(Self::PercentOff(points))
    }

    /// Fixed amount discount.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NegativeAmount`] for a negative amount.
    pub fn amount_off(amount: Money<'a, Currency>) -> Result<Self, PolicyError> {
        ensure_non_negative(&amount, "discount amount")?;

        Ok(Self::AmountOff(amount))
    }
}

/// Lifecycle state reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PolicyStatus {
    /// Can be selected.
    #[default]
    Available,

    /// Already consumed by this customer.
    Used,

    /// Switched off by the backend, with a reason to show the customer.
    Disabled(String),
}

/// A discount rule with eligibility constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountPolicy<'a> {
    id: PolicyId,
    vendor: VendorId,
    name: String,
    kind: DiscountKind<'a>,
    min_purchase: Option<Money<'a, Currency>>,
    max_discount: Option<Money<'a, Currency>>,
    membership_limit: MembershipTier,
    expiry: Option<Date>,
    status: PolicyStatus,
}

impl<'a> DiscountPolicy<'a> {
    /// Create an unconstrained, available policy.
    pub fn new(
        id: PolicyId,
        vendor: VendorId,
        name: impl Into<String>,
        kind: DiscountKind<'a>,
    ) -> Self {
        Self {
            id,
            vendor,
            name: name.into(),
            kind,
            min_purchase: None,
            max_discount: None,
            membership_limit: MembershipTier::Basic,
            expiry: None,
            status: PolicyStatus::Available,
        }
    }

    /// Require a minimum subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NegativeAmount`] for a negative minimum.
    pub fn with_min_purchase(mut self, minimum: Money<'a, Currency>) -> Result<Self, PolicyError> {
        ensure_non_negative(&minimum, "minimum purchase")?;
        self.min_purchase = Some(minimum);

        Ok(self)
    }

    /// Cap the absolute discount amount.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NegativeAmount`] for a negative cap.
    pub fn with_max_discount(mut self, cap: Money<'a, Currency>) -> Result<Self, PolicyError> {
        ensure_non_negative(&cap, "maximum discount")?;
        self.max_discount = Some(cap);

        Ok(self)
    }

    /// Require a minimum membership tier.
    #[must_use]
    pub fn with_membership_limit(mut self, tier: MembershipTier) -> Self {
        self.membership_limit = tier;
        self
    }

    /// Last day the policy can be used.
    #[must_use]
    pub fn with_expiry(mut self, expiry: Date) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Backend lifecycle state.
    #[must_use]
    pub fn with_status(mut self, status: PolicyStatus) -> Self {
        self.status = status;
        self
    }

    /// Policy identifier
    pub fn id(&self) -> PolicyId {
        self.id
    }

    /// Vendor offering the policy
    pub fn vendor(&self) -> VendorId {
        self.vendor
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discount applied when usable
    pub fn kind(&self) -> &DiscountKind<'a> {
        &self.kind
    }

    /// Minimum subtotal, if any
    pub fn min_purchase(&self) -> Option<&Money<'a, Currency>> {
        self.min_purchase.as_ref()
    }

    /// Discount cap, if any
    pub fn max_discount(&self) -> Option<&Money<'a, Currency>> {
        self.max_discount.as_ref()
    }

    /// Minimum membership tier
    pub fn membership_limit(&self) -> MembershipTier {
        self.membership_limit
    }

    /// Last valid day, if any
    pub fn expiry(&self) -> Option<Date> {
        self.expiry
    }

    /// Backend lifecycle state
    pub fn status(&self) -> &PolicyStatus {
        &self.status
    }

    /// Whether the policy has run past its expiry day.
    ///
    /// The expiry day itself is usable until its last instant.
    pub fn is_expired(&self, today: Date) -> bool {
        self.expiry.is_some_and(|expiry| {
            expiry.to_datetime(Time::MAX) < today.to_datetime(Time::MIN)
        })
    }
}

fn ensure_non_negative(
    amount: &Money<'_, Currency>,
    field: &'static str,
) -> Result<(), PolicyError> {
    if amount.to_minor_units() < 0 {
        Err(PolicyError::NegativeAmount(field))
    } else {
        Ok(())
    }
}
