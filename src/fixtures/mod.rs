//! Fixtures
//!
//! Checkout scenarios stored as YAML: a cart, the signed-in customer, the
//! vendor's policies and the checkout form, optionally pinned to a date.

use std::{
    fs,
    path::{Path, PathBuf},
};

use jiff::civil::Date;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::CartSnapshot,
    checkout::CheckoutForm,
    customers::Customer,
    ids::PolicyId,
    policies::DiscountPolicy,
    records::{CartRecord, CustomerRecord, PolicyRecord, RecordError},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,

        /// Underlying IO error
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Record conversion error
    #[error("Invalid scenario data: {0}")]
    Record(#[from] RecordError),

    /// The form selects a policy the scenario does not define
    #[error("Policy not found: {0}")]
    PolicyNotFound(PolicyId),
}

/// Scenario file as written on disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFixture {
    /// Date the scenario is evaluated on
    #[serde(default)]
    pub today: Option<Date>,

    /// Cart snapshot
    pub cart: CartRecord,

    /// Signed-in customer
    pub customer: CustomerRecord,

    /// Policies offered to the customer
    #[serde(default)]
    pub policies: Vec<PolicyRecord>,

    /// Checkout form state
    #[serde(default)]
    pub checkout: CheckoutForm,
}

/// Typed checkout scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    today: Option<Date>,
    cart: CartSnapshot<'static>,
    customer: Customer<'static>,
    policies: Vec<DiscountPolicy<'static>>,
    form: CheckoutForm,
}

impl Scenario {
    /// Load a named scenario from `./fixtures/scenarios/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or converted.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a named scenario from `<base_path>/scenarios/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or converted.
    pub fn from_set_in(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        let path = base_path
            .as_ref()
            .join("scenarios")
            .join(format!("{name}.yml"));

        Self::from_path(path)
    }

    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or converted.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&contents)
    }

    /// Parse a scenario from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the records are invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        let fixture: ScenarioFixture = serde_norway::from_str(yaml)?;

        Self::try_from(fixture)
    }

    /// Date the scenario is pinned to, if any.
    pub fn today(&self) -> Option<Date> {
        self.today
    }

    /// Cart snapshot
    pub fn cart(&self) -> &CartSnapshot<'static> {
        &self.cart
    }

    /// Signed-in customer
    pub fn customer(&self) -> &Customer<'static> {
        &self.customer
    }

    /// Policies in file order
    pub fn policies(&self) -> &[DiscountPolicy<'static>] {
        &self.policies
    }

    /// Checkout form state
    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Policy selected on the form, looked up by id.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::PolicyNotFound`] if the id is not defined.
    pub fn selected_policy(&self) -> Result<Option<&DiscountPolicy<'static>>, FixtureError> {
        let Some(id) = self.form.policy else {
            return Ok(None);
        };

        self.policies
            .iter()
            .find(|policy| policy.id() == id)
            .map(Some)
            .ok_or(FixtureError::PolicyNotFound(id))
    }
}

impl TryFrom<ScenarioFixture> for Scenario {
    type Error = FixtureError;

    fn try_from(fixture: ScenarioFixture) -> Result<Self, Self::Error> {
        let cart = CartSnapshot::try_from(&fixture.cart)?;
        let currency = cart.currency();
        let customer = fixture.customer.to_customer(currency);

        let policies = fixture
            .policies
            .iter()
            .map(|record| record.to_policy(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            today: fixture.today,
            cart,
            customer,
            policies,
            form: fixture.checkout,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::{Money, iso::KRW};
    use testresult::TestResult;

    use crate::{checkout::PaymentMethod, customers::MembershipTier};

    use super::*;

    const SCENARIO: &str = r"
today: 2026-10-16
cart:
  vendorId: 1
  currency: KRW
  items:
    - { productId: 1, name: Americano, unitPrice: 4500, quantity: 2, subtotal: 9000 }
  totalAmount: 9000
customer:
  id: 7
  membership: gold
  balance: 10000
policies:
  - { id: 2, vendorId: 1, name: Ten off, type: percent, value: 10 }
checkout:
  policy: 2
  payment: balance
";

    #[test]
    fn from_yaml_builds_typed_scenario() -> TestResult {
        let scenario = Scenario::from_yaml(SCENARIO)?;

        assert_eq!(scenario.today(), Some(date(2026, 10, 16)));
        assert_eq!(scenario.cart().total_amount(), Money::from_minor(9_000, KRW));
        assert_eq!(scenario.customer().tier(), MembershipTier::Gold);
        assert_eq!(scenario.policies().len(), 1);
        assert_eq!(scenario.form().payment, PaymentMethod::StoredBalance);
        assert_eq!(
            scenario.selected_policy()?.map(DiscountPolicy::id),
            Some(PolicyId(2))
        );

        Ok(())
    }

    #[test]
    fn unknown_selected_policy_errors() -> TestResult {
        let yaml = SCENARIO.replace("policy: 2", "policy: 9");
        let scenario = Scenario::from_yaml(&yaml)?;

        assert!(matches!(
            scenario.selected_policy(),
            Err(FixtureError::PolicyNotFound(PolicyId(9)))
        ));

        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let result = Scenario::from_set_in("/nonexistent", "nothing");

        assert!(
            matches!(result, Err(FixtureError::Io { path, .. }) if path.ends_with("nothing.yml"))
        );
    }

    #[test]
    fn invalid_yaml_errors() {
        let result = Scenario::from_yaml("cart: [");

        assert!(matches!(result, Err(FixtureError::Yaml(_))));
    }
}
