//! Terminal report

use std::io;

use brewcart::{
    checkout::CheckoutRequest,
    eligibility::PolicyOption,
    policies::{DiscountKind, DiscountPolicy},
    quote::Quote,
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

/// Errors writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Output stream failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    /// Request could not be serialized.
    #[error("failed to serialize checkout request: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write one row per visible policy: usable first, then by id.
pub fn write_policy_table(
    out: &mut impl io::Write,
    options: &[PolicyOption<'_, '_>],
) -> Result<(), ReportError> {
    if options.is_empty() {
        writeln!(out, "No discounts available for this store.")?;
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["#", "Discount", "Offer", "Status"]);

    for option in options {
        builder.push_record([
            option.policy.id().to_string(),
            option.policy.name().to_string(),
            describe_offer(option.policy),
            option.reason().unwrap_or_else(|| "usable".to_string()),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::first(), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

/// Write the subtotal, discount and total.
pub fn write_quote(out: &mut impl io::Write, quote: &Quote<'_>) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Subtotal".to_string(), quote.subtotal().to_string()]);
    builder.push_record(["Discount".to_string(), format!("-{}", quote.discount())]);
    builder.push_record(["Total".to_string(), quote.total().to_string()]);

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::last(), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

/// Write the checkout request as pretty JSON.
pub fn write_request_json(
    out: &mut impl io::Write,
    request: &CheckoutRequest,
) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut *out, request)?;
    writeln!(out)?;

    Ok(())
}

fn describe_offer(policy: &DiscountPolicy<'_>) -> String {
    let mut offer = match policy.kind() {
        DiscountKind::PercentOff(points) => format!("{}% off", points.normalize()),
        DiscountKind::AmountOff(amount) => format!("{amount} off"),
    };

    if let Some(cap) = policy.max_discount() {
        offer.push_str(&format!(" (up to {cap})"));
    }

    if let Some(minimum) = policy.min_purchase() {
        offer.push_str(&format!(", min. {minimum}"));
    }

    offer
}
