//! Configuration file and environment handling
//!
//! Configuration is resolved once at process start: the optional TOML file is
//! read and released, then environment variables are overlaid on top. The
//! resulting struct is passed by reference into the runner and never re-read
//! mid-run.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Literal fallback marking a credential that was never configured.
///
/// A value equal to this sentinel is treated as unconfigured by
/// [`Credentials::validate`], never as a usable credential.
pub const PLACEHOLDER: &str =
    "bitte die validen Testdaten aus dem PDF Fallaufgabe Softwaretester verwenden";

/// Environment variable for the OAuth client id
pub const ENV_CLIENT_ID: &str = "SC_CLIENT_ID";
/// Environment variable for the OAuth client secret
pub const ENV_CLIENT_SECRET: &str = "SC_CLIENT_SECRET";
/// Environment variable for the general contract id
pub const ENV_CONTRACT_ID: &str = "SC_GCR";
/// Environment variable overriding the WebDriver endpoint
pub const ENV_WEBDRIVER_URL: &str = "CHECKOUT_WEBDRIVER_URL";

/// Look up `key` in the process environment; if absent, return `fallback`.
pub fn resolve(key: &str, fallback: &str) -> String {
    resolve_with(|k| std::env::var(k).ok(), key, fallback)
}

fn resolve_with<F: Fn(&str) -> Option<String>>(lookup: F, key: &str, fallback: &str) -> String {
    lookup(key).unwrap_or_else(|| fallback.to_string())
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TestConfig {
    /// Provider API settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Test credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Checkout scenario settings
    #[serde(default)]
    pub checkout: CheckoutSettings,

    /// Customer form test data
    #[serde(default)]
    pub customer: CustomerData,

    /// Credit card test data
    #[serde(default)]
    pub card: CardData,

    /// WebDriver settings
    #[serde(default)]
    pub webdriver: WebDriverSettings,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Provider API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the provider REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://connect-testing.secuconnect.com".to_string()
}

impl ApiSettings {
    /// OAuth token endpoint
    pub fn auth_endpoint(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    /// Smart Transaction collection endpoint (trailing slash is part of the API path)
    pub fn transaction_endpoint(&self) -> String {
        format!("{}/api/v2/Smart/Transactions/", self.base_url)
    }
}

/// The credential bundle required to provision a checkout test run
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth client id
    #[serde(default = "placeholder")]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default = "placeholder")]
    pub client_secret: String,

    /// General contract id the transaction is created against
    #[serde(default = "placeholder")]
    pub contract_id: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            client_id: placeholder(),
            client_secret: placeholder(),
            contract_id: placeholder(),
        }
    }
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

impl Credentials {
    fn overlay_env_with<F: Fn(&str) -> Option<String> + Copy>(&mut self, lookup: F) {
        self.client_id = resolve_with(lookup, ENV_CLIENT_ID, &self.client_id);
        self.client_secret = resolve_with(lookup, ENV_CLIENT_SECRET, &self.client_secret);
        self.contract_id = resolve_with(lookup, ENV_CONTRACT_ID, &self.contract_id);
    }

    /// Check that every field holds a real value
    ///
    /// Fails naming the first field that is empty or still the placeholder
    /// sentinel, before any network or browser action is attempted.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("contract_id", &self.contract_id),
        ] {
            if value.is_empty() || value == PLACEHOLDER {
                return Err(Error::MissingCredential { field });
            }
        }
        Ok(())
    }
}

/// Shorten a secret to a loggable prefix
pub fn redact(secret: &str) -> String {
    if secret.is_empty() || secret == PLACEHOLDER {
        "<unset>".to_string()
    } else {
        let prefix: String = secret.chars().take(4).collect();
        format!("{}****", prefix)
    }
}

/// Checkout scenario settings
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSettings {
    /// Merchant reference attached to the transaction
    #[serde(default = "default_merchant_ref")]
    pub merchant_ref: String,

    /// Hosted checkout template id
    #[serde(default = "default_checkout_template")]
    pub checkout_template: String,

    /// Description of the single test article
    #[serde(default = "default_article_desc")]
    pub article_desc: String,

    /// Article number of the single test article
    #[serde(default = "default_article_number")]
    pub article_number: String,

    /// Basket total in cents
    #[serde(default = "default_amount_cents")]
    pub amount_cents: u32,

    /// Tax rate in percent
    #[serde(default = "default_tax_percent")]
    pub tax_percent: u32,

    /// Basket currency
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Return URL for a successful payment; its marker is what the runner
    /// waits for after submit
    #[serde(default = "default_url_success")]
    pub url_success: String,

    /// Return URL for a declined payment
    #[serde(default = "default_url_error")]
    pub url_error: String,

    /// Return URL for an aborted payment
    #[serde(default = "default_url_abort")]
    pub url_abort: String,

    /// Substring the checkout page URL must contain after navigation
    #[serde(default = "default_path_marker")]
    pub path_marker: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            merchant_ref: default_merchant_ref(),
            checkout_template: default_checkout_template(),
            article_desc: default_article_desc(),
            article_number: default_article_number(),
            amount_cents: default_amount_cents(),
            tax_percent: default_tax_percent(),
            currency: default_currency(),
            url_success: default_url_success(),
            url_error: default_url_error(),
            url_abort: default_url_abort(),
            path_marker: default_path_marker(),
        }
    }
}

fn default_merchant_ref() -> String {
    "50001234".to_string()
}
fn default_checkout_template() -> String {
    "COT_WD0DE66HN2XWJHW8JM88003YG0NEA2".to_string()
}
fn default_article_desc() -> String {
    "Test-Produkt".to_string()
}
fn default_article_number() -> String {
    "TEST-001".to_string()
}
fn default_amount_cents() -> u32 {
    1000
}
fn default_tax_percent() -> u32 {
    19
}
fn default_currency() -> String {
    "EUR".to_string()
}
fn default_url_success() -> String {
    "https://example.org/SUCCESS".to_string()
}
fn default_url_error() -> String {
    "https://example.org/ERROR".to_string()
}
fn default_url_abort() -> String {
    "https://example.org/FAILURE".to_string()
}
fn default_path_marker() -> String {
    "/checkout".to_string()
}

/// Customer form test data
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerData {
    #[serde(default = "default_email")]
    pub email: String,
    /// Salutation key, "mr" or "ms"
    #[serde(default = "default_salutation")]
    pub salutation: String,
    #[serde(default = "default_first_name")]
    pub first_name: String,
    #[serde(default = "default_last_name")]
    pub last_name: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_zip")]
    pub zip_code: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_street")]
    pub street: String,
}

impl Default for CustomerData {
    fn default() -> Self {
        Self {
            email: default_email(),
            salutation: default_salutation(),
            first_name: default_first_name(),
            last_name: default_last_name(),
            country: default_country(),
            zip_code: default_zip(),
            city: default_city(),
            street: default_street(),
        }
    }
}

fn default_email() -> String {
    "testuser@example.com".to_string()
}
fn default_salutation() -> String {
    "mr".to_string()
}
fn default_first_name() -> String {
    "Max".to_string()
}
fn default_last_name() -> String {
    "Mustermann".to_string()
}
fn default_country() -> String {
    "DE".to_string()
}
fn default_zip() -> String {
    "12345".to_string()
}
fn default_city() -> String {
    "Berlin".to_string()
}
fn default_street() -> String {
    "Teststraße 2".to_string()
}

/// Credit card test data
#[derive(Debug, Clone, Deserialize)]
pub struct CardData {
    #[serde(default = "default_holder")]
    pub holder: String,
    #[serde(default = "default_number")]
    pub number: String,
    #[serde(default = "default_cvv")]
    pub cvv: String,
    #[serde(default = "default_expiry_month")]
    pub expiry_month: String,
    #[serde(default = "default_expiry_year")]
    pub expiry_year: String,
}

impl Default for CardData {
    fn default() -> Self {
        Self {
            holder: default_holder(),
            number: default_number(),
            cvv: default_cvv(),
            expiry_month: default_expiry_month(),
            expiry_year: default_expiry_year(),
        }
    }
}

fn default_holder() -> String {
    "Max Mustermann".to_string()
}
fn default_number() -> String {
    "4635440000002298".to_string()
}
fn default_cvv() -> String {
    "123".to_string()
}
fn default_expiry_month() -> String {
    "12".to_string()
}
fn default_expiry_year() -> String {
    "2026".to_string()
}

/// WebDriver settings
#[derive(Debug, Clone, Deserialize)]
pub struct WebDriverSettings {
    /// Endpoint of the WebDriver server (chromedriver)
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Run the browser headless
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://127.0.0.1:9515".to_string()
}
fn default_headless() -> bool {
    true
}

/// Timeout settings in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct Timeouts {
    /// Timeout for a single wait-for-element
    #[serde(default = "default_explicit_wait")]
    pub explicit_wait_secs: u64,

    /// Timeout for a single HTTP request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for the post-submit redirect outcome
    #[serde(default = "default_result_wait")]
    pub result_wait_secs: u64,

    /// Upper bound on any single scenario step
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            explicit_wait_secs: default_explicit_wait(),
            request_timeout_secs: default_request_timeout(),
            result_wait_secs: default_result_wait(),
            step_timeout_secs: default_step_timeout(),
        }
    }
}

fn default_explicit_wait() -> u64 {
    20
}
fn default_request_timeout() -> u64 {
    20
}
fn default_result_wait() -> u64 {
    40
}
fn default_step_timeout() -> u64 {
    60
}

impl Timeouts {
    pub fn explicit_wait(&self) -> Duration {
        Duration::from_secs(self.explicit_wait_secs)
    }
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
    pub fn result_wait(&self) -> Duration {
        Duration::from_secs(self.result_wait_secs)
    }
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

impl TestConfig {
    /// Load configuration and overlay the process environment
    ///
    /// With `explicit_path` the file must exist and parse; otherwise the
    /// default config file is used when present, defaults when not. The file
    /// is read once and released before the run starts.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let content = match explicit_path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|e| Error::FileRead {
                path: path.display().to_string(),
                error: e.to_string(),
            })?),
            None => match config_path() {
                Some(path) if path.exists() => {
                    Some(std::fs::read_to_string(&path).map_err(|e| Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    })?)
                }
                _ => None,
            },
        };

        Self::from_parts(content.as_deref(), |k| std::env::var(k).ok())
    }

    /// Build a config from optional file content and an environment lookup
    ///
    /// Environment values take precedence over file values, which take
    /// precedence over built-in defaults.
    pub fn from_parts<F: Fn(&str) -> Option<String> + Copy>(
        file_content: Option<&str>,
        lookup: F,
    ) -> Result<Self> {
        let mut config: Self = match file_content {
            Some(content) => {
                toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?
            }
            None => Self::default(),
        };

        config.credentials.overlay_env_with(lookup);
        config.webdriver.url = resolve_with(lookup, ENV_WEBDRIVER_URL, &config.webdriver.url);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn resolve_falls_back_when_env_is_unset() {
        // A key nothing in the environment would ever define
        assert_eq!(resolve("CHECKOUT_TEST_NO_SUCH_KEY", PLACEHOLDER), PLACEHOLDER);
        assert_eq!(resolve("CHECKOUT_TEST_NO_SUCH_KEY", ""), "");
    }

    #[test]
    fn unset_env_resolves_to_placeholder_and_fails_validation() {
        let config = TestConfig::from_parts(None, no_env).unwrap();
        assert_eq!(config.credentials.client_id, PLACEHOLDER);
        assert_eq!(config.credentials.client_secret, PLACEHOLDER);
        assert_eq!(config.credentials.contract_id, PLACEHOLDER);

        let err = config.credentials.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::MissingCredential { field: "client_id" }
        ));
    }

    #[test]
    fn each_missing_field_is_named_individually() {
        let valid = Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            contract_id: "GCR_1".to_string(),
        };

        for field in ["client_id", "client_secret", "contract_id"] {
            let mut creds = valid.clone();
            match field {
                "client_id" => creds.client_id.clear(),
                "client_secret" => creds.client_secret.clear(),
                _ => creds.contract_id.clear(),
            }
            match creds.validate().unwrap_err() {
                Error::MissingCredential { field: named } => assert_eq!(named, field),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn placeholder_value_is_rejected_like_empty() {
        let creds = Credentials {
            client_id: "id".to_string(),
            client_secret: PLACEHOLDER.to_string(),
            contract_id: "GCR_1".to_string(),
        };
        assert!(matches!(
            creds.validate().unwrap_err(),
            Error::MissingCredential {
                field: "client_secret"
            }
        ));
    }

    #[test]
    fn env_takes_precedence_over_file() {
        let file = r#"
            [credentials]
            client_id = "from-file"
            client_secret = "file-secret"
            contract_id = "file-contract"
        "#;
        let lookup = |k: &str| (k == ENV_CLIENT_ID).then(|| "from-env".to_string());

        let config = TestConfig::from_parts(Some(file), lookup).unwrap();
        assert_eq!(config.credentials.client_id, "from-env");
        assert_eq!(config.credentials.client_secret, "file-secret");
        assert!(config.credentials.validate().is_ok());
    }

    #[test]
    fn resolver_is_idempotent() {
        let lookup = |k: &str| (k == ENV_CLIENT_SECRET).then(|| "s3cret".to_string());

        let first = TestConfig::from_parts(None, lookup).unwrap();
        let second = TestConfig::from_parts(None, lookup).unwrap();
        assert_eq!(first.credentials, second.credentials);
    }

    #[test]
    fn webdriver_url_env_override() {
        let lookup = |k: &str| (k == ENV_WEBDRIVER_URL).then(|| "http://127.0.0.1:4444".to_string());
        let config = TestConfig::from_parts(None, lookup).unwrap();
        assert_eq!(config.webdriver.url, "http://127.0.0.1:4444");
    }

    #[test]
    fn file_overrides_test_data_defaults() {
        let file = r#"
            [customer]
            email = "qa@example.org"

            [timeouts]
            explicit_wait_secs = 5
        "#;
        let config = TestConfig::from_parts(Some(file), no_env).unwrap();
        assert_eq!(config.customer.email, "qa@example.org");
        assert_eq!(config.customer.city, "Berlin");
        assert_eq!(config.timeouts.explicit_wait(), Duration::from_secs(5));
        assert_eq!(config.timeouts.result_wait(), Duration::from_secs(40));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = TestConfig::from_parts(Some("credentials = 3"), no_env).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn redact_hides_all_but_prefix() {
        assert_eq!(redact("abcdef123456"), "abcd****");
        assert_eq!(redact(""), "<unset>");
        assert_eq!(redact(PLACEHOLDER), "<unset>");
    }

    #[test]
    fn derived_endpoints() {
        let api = ApiSettings {
            base_url: "https://api.example".to_string(),
        };
        assert_eq!(api.auth_endpoint(), "https://api.example/oauth/token");
        assert_eq!(
            api.transaction_endpoint(),
            "https://api.example/api/v2/Smart/Transactions/"
        );
    }
}
