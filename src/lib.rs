//! Brewcart
//!
//! Brewcart prices a beverage storefront cart: it applies a vendor's discount
//! policy to the cart subtotal, decides which policies a customer may pick,
//! and validates the checkout form before the order is submitted.

pub mod cart;
pub mod checkout;
pub mod customers;
pub mod discounts;
pub mod eligibility;
pub mod fixtures;
pub mod ids;
pub mod policies;
pub mod prelude;
pub mod pricing;
pub mod quote;
pub mod records;
