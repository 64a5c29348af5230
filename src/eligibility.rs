//! Policy Eligibility
//!
//! Decides which of a vendor's policies a customer may pick for the current
//! cart. Policies are re-evaluated on every call; nothing is cached between
//! cart changes.

use std::fmt;

use jiff::civil::Date;
use rusty_money::{Money, MoneyError, iso::Currency};
use tracing::{debug, trace};

use crate::{
    cart::CartSnapshot,
    customers::{Customer, MembershipTier},
    policies::{DiscountPolicy, PolicyStatus},
};

/// Why a visible policy cannot be picked right now.
#[derive(Debug, Clone, PartialEq)]
pub enum IneligibilityReason<'a> {
    /// The policy's last valid day has passed.
    Expired {
        /// Last valid day
        expiry: Date,
    },

    /// The customer's tier is below the policy's requirement.
    MembershipTooLow {
        /// Tier the policy requires
        required: MembershipTier,

        /// Tier the customer holds
        current: MembershipTier,
    },

    /// The subtotal is below the policy's minimum purchase.
    BelowMinimumPurchase {
        /// Required subtotal
        minimum: Money<'a, Currency>,

        /// Amount still to add to the cart
        shortfall: Money<'a, Currency>,
    },

    /// The backend switched the policy off.
    Disabled(String),
}

impl fmt::Display for IneligibilityReason<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired { expiry } => write!(f, "expired on {expiry}"),
            Self::MembershipTooLow { required, current } => write!(
                f,
                "requires {required} membership or higher (you are {current})"
            ),
            Self::BelowMinimumPurchase { minimum, shortfall } => write!(
                f,
                "minimum purchase of {minimum} required; add {shortfall} more"
            ),
            Self::Disabled(reason) => f.write_str(reason),
        }
    }
}

/// Whether a visible policy can be picked.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility<'a> {
    /// The policy may be applied to the cart.
    Usable,

    /// The policy is shown but cannot be picked.
    Unusable(IneligibilityReason<'a>),
}

/// A visible policy paired with its eligibility for the current cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOption<'p, 'a> {
    /// The policy as supplied by the backend
    pub policy: &'p DiscountPolicy<'a>,

    /// Eligibility for the cart and customer it was evaluated against
    pub eligibility: Eligibility<'a>,
}

impl PolicyOption<'_, '_> {
    /// Whether the policy may be applied.
    pub fn is_usable(&self) -> bool {
        matches!(self.eligibility, Eligibility::Usable)
    }

    /// Human-readable reason the policy cannot be picked, if any.
    pub fn reason(&self) -> Option<String> {
        match &self.eligibility {
            Eligibility::Usable => None,
            Eligibility::Unusable(reason) => Some(reason.to_string()),
        }
    }
}

/// Classify `policies` for a cart and customer on `today`.
///
/// Nothing is visible for an empty or zero-total cart. Otherwise policies from
/// other vendors and policies already used are hidden, and the rest are
/// returned usable first, then by ascending id within each group.
///
/// # Errors
///
/// Returns [`MoneyError::CurrencyMismatch`] when a policy's minimum purchase is
/// in a different currency to the cart.
pub fn filter_usable_policies<'p, 'a>(
    policies: &'p [DiscountPolicy<'a>],
    cart: &CartSnapshot<'a>,
    customer: &Customer<'a>,
    today: Date,
) -> Result<Vec<PolicyOption<'p, 'a>>, MoneyError> {
    if is_blank(cart) {
        debug!(candidates = policies.len(), "cart is empty, no policies shown");

        return Ok(Vec::new());
    }

    let mut options = Vec::with_capacity(policies.len());

    for policy in policies {
        let Some(eligibility) = policy_eligibility(policy, cart, customer, today)? else {
            trace!(policy = %policy.id(), "policy hidden");
            continue;
        };

        trace!(policy = %policy.id(), ?eligibility, "policy classified");

        options.push(PolicyOption { policy, eligibility });
    }

    options.sort_by_key(|option| (!option.is_usable(), option.policy.id()));

    debug!(
        candidates = policies.len(),
        visible = options.len(),
        usable = options.iter().filter(|option| option.is_usable()).count(),
        "policies filtered"
    );

    Ok(options)
}

/// Eligibility of a single policy, or `None` when the policy is hidden.
///
/// # Errors
///
/// Returns [`MoneyError::CurrencyMismatch`] when the policy's minimum purchase
/// is in a different currency to the cart.
pub fn policy_eligibility<'a>(
    policy: &DiscountPolicy<'a>,
    cart: &CartSnapshot<'a>,
    customer: &Customer<'a>,
    today: Date,
) -> Result<Option<Eligibility<'a>>, MoneyError> {
    if is_blank(cart)
        || policy.vendor() != cart.vendor()
        || *policy.status() == PolicyStatus::Used
    {
        return Ok(None);
    }

    let eligibility = match ineligibility(policy, cart, customer, today)? {
        Some(reason) => Eligibility::Unusable(reason),
        None => Eligibility::Usable,
    };

    Ok(Some(eligibility))
}

fn is_blank(cart: &CartSnapshot<'_>) -> bool {
    cart.is_empty() || cart.total_amount().to_minor_units() == 0
}

/// First exclusion condition that holds for a visible policy.
fn ineligibility<'a>(
    policy: &DiscountPolicy<'a>,
    cart: &CartSnapshot<'a>,
    customer: &Customer<'a>,
    today: Date,
) -> Result<Option<IneligibilityReason<'a>>, MoneyError> {
    if let PolicyStatus::Disabled(reason) = policy.status() {
        return Ok(Some(IneligibilityReason::Disabled(reason.clone())));
    }

    if let Some(expiry) = policy.expiry().filter(|_| policy.is_expired(today)) {
        return Ok(Some(IneligibilityReason::Expired { expiry }));
    }

    if !customer.meets_tier(policy.membership_limit()) {
        return Ok(Some(IneligibilityReason::MembershipTooLow {
            required: policy.membership_limit(),
            current: customer.tier(),
        }));
    }

    if let Some(minimum) = policy.min_purchase() {
        let shortfall = minimum.sub(cart.total_amount())?;

        if shortfall.to_minor_units() > 0 {
            return Ok(Some(IneligibilityReason::BelowMinimumPurchase {
                minimum: *minimum,
                shortfall,
            }));
        }
    }

    Ok(None)
}
