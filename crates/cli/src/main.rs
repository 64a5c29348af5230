//! Brewcart checkout quote CLI
//!
//! Loads a checkout scenario, lists the discounts the customer can pick, prices
//! the cart with the selected discount and validates the checkout form.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::{self, ExitCode},
};

use brewcart::{
    checkout::{CheckoutError, prepare_checkout},
    eligibility::filter_usable_policies,
    fixtures::{FixtureError, Scenario},
};
use jiff::{Zoned, civil::Date};
use rusty_money::MoneyError;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    config::QuoteConfig,
    report::{ReportError, write_policy_table, write_quote, write_request_json},
};

mod config;
mod logging;
mod report;

/// Failures that end the run with a non-zero exit code.
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load scenario {path}: {source}")]
    Scenario {
        path: PathBuf,
        source: FixtureError,
    },

    #[error("failed to classify policies: {0}")]
    Policies(#[from] MoneyError),

    #[error("checkout blocked: {0}")]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

fn main() -> ExitCode {
    let config = QuoteConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(e) = logging::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("Logging error: {e}");
        }

        process::exit(1);
    }

    match run(&config, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(run_error) => {
            error!("{run_error}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &QuoteConfig, out: &mut impl Write) -> Result<(), CliError> {
    let scenario = Scenario::from_path(&config.scenario).map_err(|source| CliError::Scenario {
        path: config.scenario.clone(),
        source,
    })?;

    let today = resolve_today(config.today, scenario.today());

    info!(scenario = %config.scenario.display(), %today, "scenario loaded");

    let options = filter_usable_policies(
        scenario.policies(),
        scenario.cart(),
        scenario.customer(),
        today,
    )?;

    write_policy_table(out, &options)?;

    let selected = scenario
        .selected_policy()
        .map_err(|source| CliError::Scenario {
            path: config.scenario.clone(),
            source,
        })?;

    debug!(policy = ?selected.map(|policy| policy.id()), "policy selected");

    let prepared = prepare_checkout(
        scenario.form(),
        scenario.cart(),
        scenario.customer(),
        selected,
        today,
    )?;

    write_quote(out, &prepared.quote)?;

    if config.json {
        write_request_json(out, &prepared.request)?;
    }

    Ok(())
}

/// Explicit flag first, then the scenario's pinned date, then the local date.
fn resolve_today(flag: Option<Date>, scenario: Option<Date>) -> Date {
    flag.or(scenario).unwrap_or_else(|| Zoned::now().date())
}
