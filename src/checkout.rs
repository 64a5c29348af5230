//! Checkout
//!
//! Pre-submission validation and construction of the order request handed to
//! the order service.

use jiff::civil::Date;
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::CartSnapshot,
    customers::Customer,
    discounts::DiscountError,
    eligibility::{Eligibility, policy_eligibility},
    ids::{CustomerId, PolicyId, VendorId},
    policies::DiscountPolicy,
    quote::Quote,
};

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Collected at the store.
    #[default]
    Pickup,

    /// Delivered to the shipping address.
    Delivery,
}

/// How the order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid on collection or delivery.
    #[default]
    Cash,

    /// Deducted from the customer's stored balance.
    #[serde(rename = "balance")]
    StoredBalance,
}

/// Reasons checkout cannot proceed. The display text is shown to the customer.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart empty")]
    EmptyCart,

    /// Delivery was chosen without a shipping address.
    #[error("address required")]
    AddressRequired,

    /// The stored balance does not cover the final amount.
    #[error("insufficient balance: {balance} available, {required} required")]
    InsufficientBalance {
        /// Formatted stored balance
        balance: String,

        /// Formatted final amount
        required: String,
    },

    /// The policy passed in is not the one selected on the form.
    #[error("selected discount does not match the discount applied")]
    PolicyMismatch {
        /// Policy selected on the form
        selected: Option<PolicyId>,

        /// Policy supplied for pricing
        applied: Option<PolicyId>,
    },

    /// The selected policy is hidden for this cart and customer.
    #[error("discount {0} is not available for this order")]
    PolicyHidden(PolicyId),

    /// The selected policy is shown but cannot be picked.
    #[error("discount {policy} cannot be used: {reason}")]
    PolicyUnavailable {
        /// Selected policy
        policy: PolicyId,

        /// Customer-facing reason
        reason: String,
    },

    /// The cart could not be priced.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Check checkout preconditions, returning the first failure found.
///
/// Failures are checked in order: empty cart, missing delivery address,
/// insufficient stored balance.
///
/// # Errors
///
/// Returns the first [`CheckoutError`] that applies, or
/// [`CheckoutError::Money`] if the balance is held in another currency.
pub fn validate_checkout(
    cart: &CartSnapshot<'_>,
    delivery: DeliveryMethod,
    address: &str,
    payment: PaymentMethod,
    customer: &Customer<'_>,
    final_amount: &Money<'_, Currency>,
) -> Result<(), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    if delivery == DeliveryMethod::Delivery && address.trim().is_empty() {
        return Err(CheckoutError::AddressRequired);
    }

    if payment == PaymentMethod::StoredBalance {
        let balance = customer.balance();

        if balance.currency() != final_amount.currency() {
            return Err(CheckoutError::Money(MoneyError::CurrencyMismatch {
                expected: final_amount.currency().iso_alpha_code,
                actual: balance.currency().iso_alpha_code,
            }));
        }

        if balance.to_minor_units() < final_amount.to_minor_units() {
            return Err(CheckoutError::InsufficientBalance {
                balance: balance.to_string(),
                required: final_amount.to_string(),
            });
        }
    }

    Ok(())
}

/// Choices the customer made on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    /// Selected discount policy
    #[serde(default)]
    pub policy: Option<PolicyId>,

    /// Pickup or delivery
    #[serde(default)]
    pub delivery: DeliveryMethod,

    /// Shipping address, required for delivery
    #[serde(default)]
    pub address: String,

    /// Cash or stored balance
    #[serde(default)]
    pub payment: PaymentMethod,

    /// Free-text note to the vendor
    #[serde(default)]
    pub note: String,
}

/// Order request payload submitted to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Customer placing the order
    pub customer_id: CustomerId,

    /// Vendor fulfilling the order
    pub vendor_id: VendorId,

    /// Selected discount policy, or null
    pub policy_id: Option<PolicyId>,

    /// Free-text note
    pub note: String,

    /// Payment method tag
    pub payment_method: PaymentMethod,

    /// Whether the order is delivered
    pub delivery: bool,

    /// Shipping address; empty for pickup
    pub address: String,
}

/// A validated request together with the quote it was priced at.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCheckout<'a> {
    /// Payload for the order service
    pub request: CheckoutRequest,

    /// Amounts shown to the customer
    pub quote: Quote<'a>,
}

/// Check the selected policy, price the cart, validate the form and build the
/// order request.
///
/// `policy` is the policy the form selected, already looked up by id. It must
/// be usable for the cart and customer on `today`.
///
/// # Errors
///
/// Returns a [`CheckoutError`] when the policy cannot be applied, or when
/// pricing or validation fails.
pub fn prepare_checkout<'a>(
    form: &CheckoutForm,
    cart: &CartSnapshot<'a>,
    customer: &Customer<'a>,
    policy: Option<&DiscountPolicy<'a>>,
    today: Date,
) -> Result<PreparedCheckout<'a>, CheckoutError> {
    let applied = policy.map(DiscountPolicy::id);

    if applied != form.policy {
        return Err(CheckoutError::PolicyMismatch {
            selected: form.policy,
            applied,
        });
    }

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    if let Some(policy) = policy {
        ensure_usable(policy, cart, customer, today)?;
    }

    let quote = Quote::calculate(cart, policy)?;

    validate_checkout(
        cart,
        form.delivery,
        &form.address,
        form.payment,
        customer,
        &quote.total(),
    )?;

    let delivery = form.delivery == DeliveryMethod::Delivery;
    let address = if delivery {
        form.address.trim().to_string()
    } else {
        String::new()
    };

    let request = CheckoutRequest {
        customer_id: customer.id(),
        vendor_id: cart.vendor(),
        policy_id: applied,
        note: form.note.trim().to_string(),
        payment_method: form.payment,
        delivery,
        address,
    };

    debug!(
        customer = %request.customer_id,
        vendor = %request.vendor_id,
        total = quote.total().to_minor_units(),
        "checkout prepared"
    );

    Ok(PreparedCheckout { request, quote })
}

fn ensure_usable<'a>(
    policy: &DiscountPolicy<'a>,
    cart: &CartSnapshot<'a>,
    customer: &Customer<'a>,
    today: Date,
) -> Result<(), CheckoutError> {
    match policy_eligibility(policy, cart, customer, today)? {
        Some(Eligibility::Usable) => Ok(()),
        Some(Eligibility::Unusable(reason)) => Err(CheckoutError::PolicyUnavailable {
            policy: policy.id(),
            reason: reason.to_string(),
        }),
        None => Err(CheckoutError::PolicyHidden(policy.id())),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal::Decimal;
    use rusty_money::iso::{KRW, USD};
    use testresult::TestResult;

    use crate::{
        cart::CartLine,
        customers::MembershipTier,
        ids::ProductId,
        policies::{DiscountKind, PolicyStatus},
    };

    use super::*;

    fn today() -> Date {
        date(2026, 10, 16)
    }

    fn ten_percent<'a>(id: u64) -> TestResult<DiscountPolicy<'a>> {
        Ok(DiscountPolicy::new(
            PolicyId(id),
            VendorId(3),
            "Ten percent",
            DiscountKind::percent_off(Decimal::TEN)?,
        ))
    }

    fn prepare_with<'a>(
        form: &CheckoutForm,
        policy: Option<&DiscountPolicy<'a>>,
    ) -> TestResult<Result<PreparedCheckout<'a>, CheckoutError>> {
        Ok(prepare_checkout(form, &cart()?, &customer(100), policy, today()))
    }

    fn selecting(policy: u64) -> CheckoutForm {
        CheckoutForm {
            policy: Some(PolicyId(policy)),
            ..CheckoutForm::default()
        }
    }

    fn cart<'a>() -> TestResult<CartSnapshot<'a>> {
        let line = CartLine::new(ProductId(1), "Latte", Money::from_minor(40, KRW), 2)?;

        Ok(CartSnapshot::with_lines(VendorId(3), [line], KRW)?)
    }

    fn customer<'a>(balance: i64) -> Customer<'a> {
        Customer::new(
            CustomerId(11),
            MembershipTier::Silver,
            Money::from_minor(balance, KRW),
        )
    }

    #[test]
    fn empty_cart_wins_over_everything_else() {
        let cart = CartSnapshot::new(VendorId(3), KRW);

        let result = validate_checkout(
            &cart,
            DeliveryMethod::Delivery,
            "   ",
            PaymentMethod::StoredBalance,
            &customer(0),
            &Money::from_minor(1_000, KRW),
        );

        assert_eq!(result, Err(CheckoutError::EmptyCart));
        assert_eq!(CheckoutError::EmptyCart.to_string(), "cart empty");
    }

    #[test]
    fn delivery_requires_non_blank_address() -> TestResult {
        let result = validate_checkout(
            &cart()?,
            DeliveryMethod::Delivery,
            " \t ",
            PaymentMethod::StoredBalance,
            &customer(0),
            &Money::from_minor(80, KRW),
        );

        assert_eq!(result, Err(CheckoutError::AddressRequired));

        Ok(())
    }

    #[test]
    fn pickup_ignores_blank_address() -> TestResult {
        let result = validate_checkout(
            &cart()?,
            DeliveryMethod::Pickup,
            "",
            PaymentMethod::Cash,
            &customer(0),
            &Money::from_minor(80, KRW),
        );

        assert_eq!(result, Ok(()));

        Ok(())
    }

    #[test]
    fn insufficient_balance_mentions_both_amounts() -> TestResult {
        let result = validate_checkout(
            &cart()?,
            DeliveryMethod::Pickup,
            "",
            PaymentMethod::StoredBalance,
            &customer(50),
            &Money::from_minor(80, KRW),
        );

        let error = result.err();
        let message = error.as_ref().map(ToString::to_string).unwrap_or_default();

        assert!(matches!(error, Some(CheckoutError::InsufficientBalance { .. })));
        assert!(message.contains("50"), "{message}");
        assert!(message.contains("80"), "{message}");

        Ok(())
    }

    #[test]
    fn exact_balance_is_enough() -> TestResult {
        let result = validate_checkout(
            &cart()?,
            DeliveryMethod::Pickup,
            "",
            PaymentMethod::StoredBalance,
            &customer(80),
            &Money::from_minor(80, KRW),
        );

        assert_eq!(result, Ok(()));

        Ok(())
    }

    #[test]
    fn cash_ignores_balance() -> TestResult {
        let result = validate_checkout(
            &cart()?,
            DeliveryMethod::Pickup,
            "",
            PaymentMethod::Cash,
            &customer(0),
            &Money::from_minor(80, KRW),
        );

        assert_eq!(result, Ok(()));

        Ok(())
    }

    #[test]
    fn balance_in_other_currency_errors() -> TestResult {
        let customer = Customer::new(
            CustomerId(1),
            MembershipTier::Basic,
            Money::from_minor(500, USD),
        );

        let result = validate_checkout(
            &cart()?,
            DeliveryMethod::Pickup,
            "",
            PaymentMethod::StoredBalance,
            &customer,
            &Money::from_minor(80, KRW),
        );

        assert!(matches!(result, Err(CheckoutError::Money(_))));

        Ok(())
    }

    #[test]
    fn prepare_checkout_builds_request() -> TestResult {
        let policy = ten_percent(2)?;
        let form = CheckoutForm {
            policy: Some(PolicyId(2)),
            delivery: DeliveryMethod::Delivery,
            address: "  12 Bean Street  ".to_string(),
            payment: PaymentMethod::StoredBalance,
            note: "less ice".to_string(),
        };

        let prepared = prepare_checkout(&form, &cart()?, &customer(100), Some(&policy), today())?;

        assert_eq!(prepared.quote.total(), Money::from_minor(72, KRW));
        assert_eq!(
            prepared.request,
            CheckoutRequest {
                customer_id: CustomerId(11),
                vendor_id: VendorId(3),
                policy_id: Some(PolicyId(2)),
                note: "less ice".to_string(),
                payment_method: PaymentMethod::StoredBalance,
                delivery: true,
                address: "12 Bean Street".to_string(),
            }
        );

        Ok(())
    }

    #[test]
    fn prepare_checkout_validates_discounted_amount() -> TestResult {
        let form = CheckoutForm {
            payment: PaymentMethod::StoredBalance,
            ..CheckoutForm::default()
        };

        let result = prepare_checkout(&form, &cart()?, &customer(79), None, today());

        assert!(matches!(result, Err(CheckoutError::InsufficientBalance { .. })));

        Ok(())
    }

    #[test]
    fn pickup_request_drops_address() -> TestResult {
        let form = CheckoutForm {
            address: "ignored".to_string(),
            ..CheckoutForm::default()
        };

        let prepared = prepare_checkout(&form, &cart()?, &customer(0), None, today())?;

        assert!(!prepared.request.delivery);
        assert_eq!(prepared.request.address, "");
        assert_eq!(prepared.request.policy_id, None);

        Ok(())
    }

    #[test]
    fn expired_policy_is_refused() -> TestResult {
        let policy = ten_percent(1)?.with_expiry(date(2020, 1, 1));

        let result = prepare_with(&selecting(1), Some(&policy))?;

        assert_eq!(
            result.err(),
            Some(CheckoutError::PolicyUnavailable {
                policy: PolicyId(1),
                reason: "expired on 2020-01-01".to_string(),
            })
        );

        Ok(())
    }

    #[test]
    fn tier_locked_policy_is_refused() -> TestResult {
        let policy = ten_percent(1)?.with_membership_limit(MembershipTier::Vip);

        let result = prepare_with(&selecting(1), Some(&policy))?;

        assert!(matches!(
            result,
            Err(CheckoutError::PolicyUnavailable { policy: PolicyId(1), .. })
        ));

        Ok(())
    }

    #[test]
    fn used_or_foreign_policy_is_hidden() -> TestResult {
        let used = ten_percent(1)?.with_status(PolicyStatus::Used);
        let foreign = DiscountPolicy::new(
            PolicyId(2),
            VendorId(99),
            "Elsewhere",
            DiscountKind::percent_off(Decimal::TEN)?,
        );

        let used_result = prepare_with(&selecting(1), Some(&used))?;
        let foreign_result = prepare_with(&selecting(2), Some(&foreign))?;

        assert_eq!(used_result.err(), Some(CheckoutError::PolicyHidden(PolicyId(1))));
        assert_eq!(foreign_result.err(), Some(CheckoutError::PolicyHidden(PolicyId(2))));

        Ok(())
    }

    #[test]
    fn policy_must_match_form_selection() -> TestResult {
        let policy = ten_percent(1)?;

        let unselected = prepare_with(&CheckoutForm::default(), Some(&policy))?;
        let other = prepare_with(&selecting(4), Some(&policy))?;
        let missing = prepare_with(&selecting(1), None)?;

        assert_eq!(
            unselected.err(),
            Some(CheckoutError::PolicyMismatch {
                selected: None,
                applied: Some(PolicyId(1)),
            })
        );
        assert!(matches!(other, Err(CheckoutError::PolicyMismatch { .. })));
        assert!(matches!(missing, Err(CheckoutError::PolicyMismatch { .. })));

        Ok(())
    }

    #[test]
    fn empty_cart_wins_over_policy_checks() -> TestResult {
        let empty = CartSnapshot::new(VendorId(3), KRW);
        let policy = ten_percent(1)?;

        let result =
            prepare_checkout(&selecting(1), &empty, &customer(100), Some(&policy), today());

        assert_eq!(result.err(), Some(CheckoutError::EmptyCart));

        Ok(())
    }

    #[test]
    fn payment_method_serializes_with_wire_tags() -> TestResult {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cash)?, "\"cash\"");
        assert_eq!(serde_json::to_string(&PaymentMethod::StoredBalance)?, "\"balance\"");

        Ok(())
    }
}
