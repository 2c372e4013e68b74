//! Checkout page object
//!
//! Encapsulates selectors and form interactions for the hosted checkout
//! template. Hosted templates vary between tenants, so every field carries an
//! ordered list of selector candidates; the first match wins and a field with
//! no match at all names itself in the error.

use std::time::Duration;

use crate::common::config::{CardData, CheckoutSettings, CustomerData};
use crate::common::{Error, Result};
use crate::driver::{BrowserSession, ElementHandle};

/// Interval between polls while waiting on a field or redirect
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome the checkout reports after the order is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Redirected to the success return URL
    Success,
    /// Redirected to the error return URL
    Declined,
    /// Redirected to the abort return URL
    Aborted,
    /// No recognizable redirect; carries the page text or URL seen last
    Unknown(String),
}

/// A form field with ordered selector candidates
struct FieldSpec {
    label: &'static str,
    selectors: &'static [&'static str],
}

const EMAIL: FieldSpec = FieldSpec {
    label: "email",
    selectors: &[
        "#email",
        "input[name='email']",
        "input[type='email']",
        "input[autocomplete='email']",
    ],
};

const SALUTATION: FieldSpec = FieldSpec {
    label: "salutation",
    selectors: &["#salutation", "select[name='salutation']"],
};

const FIRST_NAME: FieldSpec = FieldSpec {
    label: "first name",
    selectors: &["#first-name", "input[name='first_name']", "input[name='firstname']"],
};

const LAST_NAME: FieldSpec = FieldSpec {
    label: "last name",
    selectors: &["#last-name", "input[name='last_name']", "input[name='lastname']"],
};

const ZIP_CODE: FieldSpec = FieldSpec {
    label: "zip code",
    selectors: &["#zip", "input[name='zip_code']", "input[autocomplete='postal-code']"],
};

const CITY: FieldSpec = FieldSpec {
    label: "city",
    selectors: &["#city", "input[name='city']"],
};

const STREET: FieldSpec = FieldSpec {
    label: "street",
    selectors: &["#street", "input[name='street']", "input[autocomplete='street-address']"],
};

const COUNTRY: FieldSpec = FieldSpec {
    label: "country",
    selectors: &["#country", "select[name='country']"],
};

const CARD_HOLDER: FieldSpec = FieldSpec {
    label: "card holder",
    selectors: &["#card-holder", "input[name='cardHolder']", "input[autocomplete='cc-name']"],
};

const CARD_NUMBER: FieldSpec = FieldSpec {
    label: "card number",
    selectors: &["#card-number", "input[name='cardNumber']", "input[autocomplete='cc-number']"],
};

const CARD_EXPIRY: FieldSpec = FieldSpec {
    label: "card expiry",
    selectors: &["#exp-date", "input[name='expiry']", "input[autocomplete='cc-exp']"],
};

const CARD_EXPIRY_MONTH: FieldSpec = FieldSpec {
    label: "card expiry month",
    selectors: &["#expiryMonth", "input[name='expiryMonth']"],
};

const CARD_EXPIRY_YEAR: FieldSpec = FieldSpec {
    label: "card expiry year",
    selectors: &["#expiryYear", "input[name='expiryYear']"],
};

const CARD_CVV: FieldSpec = FieldSpec {
    label: "card cvv",
    selectors: &["#cardCvv", "input[name='cvc']", "input[autocomplete='cc-csc']"],
};

const CONTINUE_BUTTON: FieldSpec = FieldSpec {
    label: "continue button",
    selectors: &["#continue", "button[data-action='continue']", "button[type='submit']"],
};

const PAY_BUTTON: FieldSpec = FieldSpec {
    label: "pay button",
    selectors: &["#pay-now", "button[data-action='pay']", "button[type='submit']"],
};

/// Driver-agnostic page object for the checkout template
pub struct CheckoutPage<'a> {
    session: &'a mut dyn BrowserSession,
    explicit_wait: Duration,
}

impl<'a> CheckoutPage<'a> {
    pub fn new(session: &'a mut dyn BrowserSession, explicit_wait: Duration) -> Self {
        Self {
            session,
            explicit_wait,
        }
    }

    /// Try each selector candidate in order
    async fn find_field(&mut self, field: &FieldSpec) -> Result<ElementHandle> {
        for selector in field.selectors {
            match self.session.find(selector).await {
                Ok(element) => return Ok(element),
                Err(Error::ElementNotFound { .. }) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(Error::ElementNotFound {
            what: field.label.to_string(),
        })
    }

    /// Poll for a field until any candidate matches or the wait elapses
    async fn wait_for_field(&mut self, field: &FieldSpec) -> Result<ElementHandle> {
        let deadline = tokio::time::Instant::now() + self.explicit_wait;

        loop {
            match self.find_field(field).await {
                Ok(element) => return Ok(element),
                Err(Error::ElementNotFound { .. }) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(Error::WaitTimeout {
                            what: format!("field '{}'", field.label),
                            elapsed_secs: self.explicit_wait.as_secs(),
                        });
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn enter(&mut self, field: &FieldSpec, value: &str) -> Result<()> {
        let element = self.find_field(field).await?;
        self.session.fill(&element, value).await?;
        tracing::debug!(field = field.label, "UI: field filled");
        Ok(())
    }

    /// Pick an option in a select field; missing select or option is
    /// tolerated since templates render these with a preselected default
    async fn try_select(&mut self, field: &FieldSpec, value: &str) -> Result<()> {
        let element = match self.find_field(field).await {
            Ok(element) => element,
            Err(Error::ElementNotFound { .. }) => return Ok(()),
            Err(other) => return Err(other),
        };
        self.session.click(&element).await?;

        match self.session.find(&format!("option[value='{value}']")).await {
            Ok(option) => self.session.click(&option).await,
            Err(Error::ElementNotFound { .. }) => Ok(()),
            Err(other) => Err(other),
        }
    }

    async fn click_button(&mut self, button: &FieldSpec) -> Result<()> {
        let element = self.wait_for_field(button).await?;
        self.session.click(&element).await?;
        tracing::debug!(button = button.label, "UI: clicked");
        Ok(())
    }

    /// Block until the customer form is rendered
    pub async fn wait_for_customer_form(&mut self) -> Result<()> {
        tracing::info!("UI: waiting for customer form");
        self.wait_for_field(&EMAIL).await?;
        Ok(())
    }

    pub async fn fill_customer_data(&mut self, data: &CustomerData) -> Result<()> {
        tracing::info!("UI: filling customer data");

        self.enter(&EMAIL, &data.email).await?;
        self.try_select(&SALUTATION, &data.salutation).await?;
        self.enter(&FIRST_NAME, &data.first_name).await?;
        self.enter(&LAST_NAME, &data.last_name).await?;
        self.enter(&ZIP_CODE, &data.zip_code).await?;
        self.enter(&CITY, &data.city).await?;
        self.enter(&STREET, &data.street).await?;
        self.try_select(&COUNTRY, &data.country).await?;

        Ok(())
    }

    /// Advance from the customer form to the payment form
    pub async fn continue_to_payment(&mut self) -> Result<()> {
        self.click_button(&CONTINUE_BUTTON).await
    }

    pub async fn fill_card_data(&mut self, card: &CardData) -> Result<()> {
        tracing::info!("UI: filling card data");

        // The payment form renders after the customer step, so wait on its
        // first field before filling anything
        let holder = self.wait_for_field(&CARD_HOLDER).await?;
        self.session.fill(&holder, &card.holder).await?;

        self.enter(&CARD_NUMBER, &card.number).await?;

        // Combined MM/YY field first, separate month and year fields as fallback
        let last_two: String = card
            .expiry_year
            .chars()
            .rev()
            .take(2)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        match self.find_field(&CARD_EXPIRY).await {
            Ok(expiry) => {
                self.session
                    .fill(&expiry, &format!("{}/{}", card.expiry_month, last_two))
                    .await?;
            }
            Err(Error::ElementNotFound { .. }) => {
                self.enter(&CARD_EXPIRY_MONTH, &card.expiry_month).await?;
                self.enter(&CARD_EXPIRY_YEAR, &card.expiry_year).await?;
            }
            Err(other) => return Err(other),
        }

        self.enter(&CARD_CVV, &card.cvv).await?;
        Ok(())
    }

    /// Submit the order
    pub async fn submit_order(&mut self) -> Result<()> {
        self.click_button(&PAY_BUTTON).await
    }

    /// Wait for the post-submit redirect and classify it
    ///
    /// Polls the current URL for the configured return URLs; when none shows
    /// up within the wait, falls back to a page-text probe. Never returns an
    /// error for an unrecognized outcome - classification is the caller's
    /// verification, not an infrastructure failure.
    pub async fn await_outcome(
        &mut self,
        checkout: &CheckoutSettings,
        timeout: Duration,
    ) -> Result<CheckoutOutcome> {
        tracing::info!("UI: waiting for redirect outcome");
        let deadline = tokio::time::Instant::now() + timeout;
        let mut last_url = String::new();

        while tokio::time::Instant::now() < deadline {
            last_url = self.session.current_url().await?;

            if last_url.contains(&checkout.url_success) {
                return Ok(CheckoutOutcome::Success);
            }
            if last_url.contains(&checkout.url_error) {
                return Ok(CheckoutOutcome::Declined);
            }
            if last_url.contains(&checkout.url_abort) {
                return Ok(CheckoutOutcome::Aborted);
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }

        let text = self.session.page_text().await.unwrap_or_default();
        let lowered = text.to_lowercase();
        if lowered.contains("erfolgreich") || lowered.contains("success") {
            return Ok(CheckoutOutcome::Success);
        }
        if lowered.contains("fehlgeschlagen") || lowered.contains("failed") {
            return Ok(CheckoutOutcome::Declined);
        }

        Ok(CheckoutOutcome::Unknown(if text.is_empty() {
            last_url
        } else {
            text
        }))
    }
}
