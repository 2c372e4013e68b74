//! Scenario steps and result types

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Ordered steps of the checkout scenario
///
/// Each step is one observable API or browser action followed by its
/// verification. The runner executes them in declaration order and aborts on
/// the first step whose verification fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Authenticate,
    CreateTransaction,
    LaunchBrowser,
    NavigateToCheckout,
    FillCustomerData,
    FillPaymentData,
    SubmitOrder,
    AwaitOutcome,
    VerifyTransaction,
}

impl Step {
    /// All steps in execution order
    pub const ALL: [Step; 9] = [
        Step::Authenticate,
        Step::CreateTransaction,
        Step::LaunchBrowser,
        Step::NavigateToCheckout,
        Step::FillCustomerData,
        Step::FillPaymentData,
        Step::SubmitOrder,
        Step::AwaitOutcome,
        Step::VerifyTransaction,
    ];

    /// Human-readable step title
    pub fn title(&self) -> &'static str {
        match self {
            Step::Authenticate => "authenticate against the provider API",
            Step::CreateTransaction => "create the checkout transaction",
            Step::LaunchBrowser => "launch the browser session",
            Step::NavigateToCheckout => "navigate to the checkout page",
            Step::FillCustomerData => "fill the customer form",
            Step::FillPaymentData => "fill the payment form",
            Step::SubmitOrder => "submit the order",
            Step::AwaitOutcome => "await the redirect outcome",
            Step::VerifyTransaction => "verify the final transaction status",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Step::Authenticate => "authenticate",
            Step::CreateTransaction => "create-transaction",
            Step::LaunchBrowser => "launch-browser",
            Step::NavigateToCheckout => "navigate-to-checkout",
            Step::FillCustomerData => "fill-customer-data",
            Step::FillPaymentData => "fill-payment-data",
            Step::SubmitOrder => "submit-order",
            Step::AwaitOutcome => "await-outcome",
            Step::VerifyTransaction => "verify-transaction",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Final status of one scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Every verification held
    Passed,
    /// A verification did not hold - the flow under test misbehaved
    Failed,
    /// The test environment broke before a verdict was possible
    Errored,
}

/// Immutable outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub status: ScenarioStatus,
    pub step_reached: Step,
    pub message: String,
    #[serde(serialize_with = "duration_as_secs")]
    pub duration: Duration,
}

fn duration_as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((d.as_secs_f64() * 1000.0).round() / 1000.0)
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }

    /// Process exit code: 0 passed, 1 failed, 2 errored
    pub fn exit_code(&self) -> i32 {
        match self.status {
            ScenarioStatus::Passed => 0,
            ScenarioStatus::Failed => 1,
            ScenarioStatus::Errored => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_declared_in_execution_order() {
        assert_eq!(Step::ALL.first(), Some(&Step::Authenticate));
        assert_eq!(Step::ALL.last(), Some(&Step::VerifyTransaction));
        assert_eq!(Step::ALL.len(), 9);
    }

    #[test]
    fn display_names_are_stable() {
        assert_eq!(Step::NavigateToCheckout.to_string(), "navigate-to-checkout");
        assert_eq!(Step::AwaitOutcome.to_string(), "await-outcome");
    }

    #[test]
    fn exit_codes_split_failed_from_errored() {
        let result = |status| ScenarioResult {
            status,
            step_reached: Step::AwaitOutcome,
            message: String::new(),
            duration: Duration::from_secs(1),
        };
        assert_eq!(result(ScenarioStatus::Passed).exit_code(), 0);
        assert_eq!(result(ScenarioStatus::Failed).exit_code(), 1);
        assert_eq!(result(ScenarioStatus::Errored).exit_code(), 2);
    }

    #[test]
    fn result_serializes_duration_as_seconds() {
        let result = ScenarioResult {
            status: ScenarioStatus::Passed,
            step_reached: Step::VerifyTransaction,
            message: "ok".to_string(),
            duration: Duration::from_millis(1500),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "passed");
        assert_eq!(value["step_reached"], "verify-transaction");
        assert_eq!(value["duration"], 1.5);
    }
}
