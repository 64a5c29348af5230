//! Customers

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::ids::CustomerId;

/// Membership tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    /// Entry tier every customer starts in.
    #[default]
    Basic,

    /// Second tier.
    Silver,

    /// Third tier.
    Gold,

    /// Highest tier.
    Vip,
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "Basic",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Vip => "VIP",
        };

        f.write_str(name)
    }
}

/// The signed-in customer placing the order.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer<'a> {
    id: CustomerId,
    tier: MembershipTier,
    balance: Money<'a, Currency>,
}

impl<'a> Customer<'a> {
    /// Creates a customer with the given tier and stored balance.
    pub fn new(id: CustomerId, tier: MembershipTier, balance: Money<'a, Currency>) -> Self {
        Self { id, tier, balance }
    }

    /// Customer identifier
    pub fn id(&self) -> CustomerId {
        self.id
    }

    /// Current membership tier
    pub fn tier(&self) -> MembershipTier {
        self.tier
    }

    /// Stored balance available for payment
    pub fn balance(&self) -> &Money<'a, Currency> {
        &self.balance
    }

    /// Whether the customer's tier is at least `required`.
    pub fn meets_tier(&self, required: MembershipTier) -> bool {
        self.tier >= required
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KRW;

    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(MembershipTier::Basic < MembershipTier::Silver);
        assert!(MembershipTier::Silver < MembershipTier::Gold);
        assert!(MembershipTier::Gold < MembershipTier::Vip);
    }

    #[test]
    fn meets_tier_is_inclusive() {
        let customer = Customer::new(
            CustomerId(1),
            MembershipTier::Gold,
            Money::from_minor(0, KRW),
        );

        assert!(customer.meets_tier(MembershipTier::Silver));
        assert!(customer.meets_tier(MembershipTier::Gold));
        assert!(!customer.meets_tier(MembershipTier::Vip));
    }

    #[test]
    fn tier_deserializes_from_lowercase() -> Result<(), serde_norway::Error> {
        let tier: MembershipTier = serde_norway::from_str("vip")?;

        assert_eq!(tier, MembershipTier::Vip);
        assert_eq!(tier.to_string(), "VIP");

        Ok(())
    }
}
