//! Runner implementation
//!
//! Drives the scenario step by step: API provisioning first, then the
//! browser. Every step is bounded by the configured step timeout, the first
//! failing verification aborts the rest, and the browser session is closed on
//! every exit path after launch.

use std::future::Future;
use std::time::{Duration, Instant};

use colored::Colorize;

use crate::api::{CreatedTransaction, Provision, SmartTransactionRequest};
use crate::common::config::TestConfig;
use crate::common::{Error, Result};
use crate::driver::{Browser, BrowserSession};
use crate::page::{CheckoutOutcome, CheckoutPage};

use super::scenario::{ScenarioResult, ScenarioStatus, Step};

/// Transaction states accepted as a successful end of the flow
const ACCEPTED_STATUSES: [&str; 3] = ["approved", "ok", "collection"];

type StepResult<T> = std::result::Result<T, (Step, Error)>;

/// Run a step's future against the step timeout and report progress
async fn bounded<T>(
    step: Step,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> StepResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => {
            println!("  {} {}", "✓".green(), step.title().dimmed());
            Ok(value)
        }
        Ok(Err(error)) => {
            println!("  {} {}: {}", "✗".red(), step.title(), error);
            Err((step, error))
        }
        Err(_) => {
            let error = Error::StepTimeout {
                step: step.to_string(),
                elapsed_secs: limit.as_secs(),
            };
            println!("  {} {}: {}", "✗".red(), step.title(), error);
            Err((step, error))
        }
    }
}

/// Executes the checkout scenario once
///
/// Expects an already validated credential set; configuration errors are
/// surfaced by the caller before a runner is built.
pub struct CheckoutRunner<P, B> {
    config: TestConfig,
    api: P,
    driver: B,
}

impl<P: Provision, B: Browser> CheckoutRunner<P, B> {
    pub fn new(config: TestConfig, api: P, driver: B) -> Self {
        Self {
            config,
            api,
            driver,
        }
    }

    /// Run the scenario to completion and reduce it to a result
    ///
    /// Never returns an error: step failures are folded into the
    /// [`ScenarioResult`] after the browser session is released.
    pub async fn run(mut self) -> ScenarioResult {
        let started = Instant::now();
        let outcome = self.execute().await;
        let duration = started.elapsed();

        match outcome {
            Ok(message) => ScenarioResult {
                status: ScenarioStatus::Passed,
                step_reached: Step::VerifyTransaction,
                message,
                duration,
            },
            Err((step, error)) => ScenarioResult {
                status: if error.is_assertion() {
                    ScenarioStatus::Failed
                } else {
                    ScenarioStatus::Errored
                },
                step_reached: step,
                message: error.to_string(),
                duration,
            },
        }
    }

    async fn execute(&mut self) -> StepResult<String> {
        let limit = self.config.timeouts.step_timeout();

        bounded(
            Step::Authenticate,
            limit,
            self.api.authenticate(&self.config.credentials),
        )
        .await?;

        let request = SmartTransactionRequest::from_config(&self.config);
        let created = bounded(
            Step::CreateTransaction,
            limit,
            self.api.create_transaction(&request),
        )
        .await?;

        let mut session = bounded(Step::LaunchBrowser, limit, self.driver.launch()).await?;

        // The session is released on every path out of the browser phase
        let drive = self.drive(&mut *session, &created).await;
        if let Err(error) = session.close().await {
            tracing::warn!(%error, "failed to close browser session");
        }
        drive
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        created: &CreatedTransaction,
    ) -> StepResult<String> {
        let limit = self.config.timeouts.step_timeout();
        let explicit_wait = self.config.timeouts.explicit_wait();

        bounded(Step::NavigateToCheckout, limit, async {
            session.navigate(&created.checkout_url).await?;
            session.wait_for("body", explicit_wait).await?;
            let url = session.current_url().await?;
            if !url.contains(&self.config.checkout.path_marker) {
                return Err(Error::assertion(
                    Step::NavigateToCheckout,
                    format!("url containing '{}'", self.config.checkout.path_marker),
                    url,
                ));
            }
            Ok(())
        })
        .await?;

        bounded(Step::FillCustomerData, limit, async {
            let mut page = CheckoutPage::new(&mut *session, explicit_wait);
            page.wait_for_customer_form().await?;
            page.fill_customer_data(&self.config.customer).await?;
            page.continue_to_payment().await
        })
        .await?;

        bounded(Step::FillPaymentData, limit, async {
            let mut page = CheckoutPage::new(&mut *session, explicit_wait);
            page.fill_card_data(&self.config.card).await
        })
        .await?;

        bounded(Step::SubmitOrder, limit, async {
            let mut page = CheckoutPage::new(&mut *session, explicit_wait);
            page.submit_order().await
        })
        .await?;

        let result_limit = limit.max(self.config.timeouts.result_wait() + Duration::from_secs(5));
        bounded(Step::AwaitOutcome, result_limit, async {
            let mut page = CheckoutPage::new(&mut *session, explicit_wait);
            let outcome = page
                .await_outcome(&self.config.checkout, self.config.timeouts.result_wait())
                .await?;
            match outcome {
                CheckoutOutcome::Success => Ok(()),
                CheckoutOutcome::Declined => Err(Error::assertion(
                    Step::AwaitOutcome,
                    "redirect to the success URL",
                    "redirect to the error URL",
                )),
                CheckoutOutcome::Aborted => Err(Error::assertion(
                    Step::AwaitOutcome,
                    "redirect to the success URL",
                    "redirect to the abort URL",
                )),
                CheckoutOutcome::Unknown(seen) => Err(Error::assertion(
                    Step::AwaitOutcome,
                    "redirect to the success URL",
                    seen,
                )),
            }
        })
        .await?;

        let status = bounded(Step::VerifyTransaction, limit, async {
            let status = self.api.transaction_status(&created.id).await?;
            if !ACCEPTED_STATUSES.contains(&status.to_lowercase().as_str()) {
                return Err(Error::assertion(
                    Step::VerifyTransaction,
                    format!("transaction status in {ACCEPTED_STATUSES:?}"),
                    status,
                ));
            }
            Ok(status)
        })
        .await?;

        Ok(format!(
            "checkout completed, transaction {} has status '{}'",
            created.id, status
        ))
    }
}
