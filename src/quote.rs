//! Quote

use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{
    cart::CartSnapshot,
    discounts::{DiscountError, compute_final_amount},
    ids::PolicyId,
    policies::DiscountPolicy,
};

/// Priced cart shown next to the pay button.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote<'a> {
    /// Policy the quote was priced with, if any
    policy: Option<PolicyId>,

    /// Total cost before any discount
    subtotal: Money<'a, Currency>,

    /// Amount taken off by the policy
    discount: Money<'a, Currency>,

    /// Amount the customer pays
    total: Money<'a, Currency>,
}

impl<'a> Quote<'a> {
    /// Price a cart with an optional policy.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discount cannot be calculated.
    pub fn calculate(
        cart: &CartSnapshot<'a>,
        policy: Option<&DiscountPolicy<'a>>,
    ) -> Result<Self, DiscountError> {
        let subtotal = cart.total_amount();
        let total = compute_final_amount(subtotal, policy)?;
        let discount = subtotal.sub(total)?;

        Ok(Self {
            policy: policy.map(DiscountPolicy::id),
            subtotal,
            discount,
            total,
        })
    }

    /// Policy the quote was priced with
    pub fn policy(&self) -> Option<PolicyId> {
        self.policy
    }

    /// Total cost before any discount
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount taken off by the policy
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Amount the customer pays
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Calculate the savings made by applying the policy.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }
}
