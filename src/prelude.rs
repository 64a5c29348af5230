//! Brewcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartLine, CartSnapshot},
    checkout::{
        CheckoutError, CheckoutForm, CheckoutRequest, DeliveryMethod, PaymentMethod,
        PreparedCheckout, prepare_checkout, validate_checkout,
    },
    customers::{Customer, MembershipTier},
    discounts::{DiscountError, compute_final_amount, discount_amount},
    eligibility::{
        Eligibility, IneligibilityReason, PolicyOption, filter_usable_policies, policy_eligibility,
    },
    fixtures::{FixtureError, Scenario},
    ids::{CustomerId, PolicyId, ProductId, VendorId},
    policies::{DiscountKind, DiscountPolicy, PolicyError, PolicyStatus},
    quote::Quote,
    records::{CartRecord, CustomerRecord, PolicyRecord, RecordError},
};
