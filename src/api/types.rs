//! Provider API wire types
//!
//! Field names follow the provider's JSON schema; the handful of camelCase
//! outliers are renamed explicitly rather than with a container attribute.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::config::TestConfig;

// === OAuth ===

/// Response body of the client-credentials token request
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

// === Smart Transaction ===

/// Smart Transaction creation request
#[derive(Debug, Clone, Serialize)]
pub struct SmartTransactionRequest {
    pub intent: String,
    pub is_demo: bool,
    pub contract: ContractRef,
    pub basket: Basket,
    pub basket_info: BasketInfo,
    #[serde(rename = "transactionRef")]
    pub transaction_ref: String,
    #[serde(rename = "merchantRef")]
    pub merchant_ref: String,
    pub application_context: ApplicationContext,
    pub payment_context: PaymentContext,
}

/// Reference to the general contract the transaction is billed against
#[derive(Debug, Clone, Serialize)]
pub struct ContractRef {
    pub object: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Basket {
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: u32,
    pub parent: Option<u32>,
    pub item_type: String,
    pub desc: String,
    #[serde(rename = "articleNumber")]
    pub article_number: String,
    pub ean: String,
    pub quantity: u32,
    /// Unit price in cents
    #[serde(rename = "priceOne")]
    pub price_one: u32,
    /// Tax rate in percent
    pub tax: u32,
    pub reference_id: Option<String>,
    pub group: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasketInfo {
    /// Basket total in cents
    pub sum: u32,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationContext {
    pub return_urls: ReturnUrls,
    pub checkout_template: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnUrls {
    pub url_success: String,
    pub url_error: String,
    pub url_abort: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentContext {
    pub auto_capture: bool,
    pub payment_methods: Option<Vec<String>>,
    pub merchant_initiated: bool,
    pub accrual: bool,
    pub creditcard_schemes: Vec<String>,
}

impl SmartTransactionRequest {
    /// Build the single-article sale transaction the scenario runs against
    pub fn from_config(config: &TestConfig) -> Self {
        let checkout = &config.checkout;
        Self {
            intent: "sale".to_string(),
            is_demo: false,
            contract: ContractRef {
                object: "general.contracts".to_string(),
                id: config.credentials.contract_id.clone(),
            },
            basket: Basket {
                products: vec![Product {
                    id: 1,
                    parent: None,
                    item_type: "article".to_string(),
                    desc: checkout.article_desc.clone(),
                    article_number: checkout.article_number.clone(),
                    ean: String::new(),
                    quantity: 1,
                    price_one: checkout.amount_cents,
                    tax: checkout.tax_percent,
                    reference_id: None,
                    group: Vec::new(),
                }],
            },
            basket_info: BasketInfo {
                sum: checkout.amount_cents,
                currency: checkout.currency.clone(),
            },
            transaction_ref: String::new(),
            merchant_ref: checkout.merchant_ref.clone(),
            application_context: ApplicationContext {
                return_urls: ReturnUrls {
                    url_success: checkout.url_success.clone(),
                    url_error: checkout.url_error.clone(),
                    url_abort: checkout.url_abort.clone(),
                },
                checkout_template: checkout.checkout_template.clone(),
                language: "de".to_string(),
            },
            payment_context: PaymentContext {
                auto_capture: true,
                payment_methods: None,
                merchant_initiated: false,
                accrual: false,
                creditcard_schemes: vec!["visa".to_string(), "mastercard".to_string()],
            },
        }
    }
}

/// Transaction id plus hosted checkout URL extracted from the creation response
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    pub id: String,
    pub checkout_url: String,
}

/// Pull the hosted checkout URL out of a creation response
///
/// The API has shipped this under several keys over time; try them in the
/// order the most recent schema prefers.
pub fn extract_checkout_url(body: &Value) -> Option<String> {
    let links = body.get("links");

    let from_links = links
        .and_then(|l| l.get("checkout"))
        .and_then(|c| c.get("href"))
        .and_then(Value::as_str)
        .or_else(|| {
            links
                .and_then(|l| l.get("checkout_url"))
                .and_then(Value::as_str)
        });

    let payment_links = body.get("payment_links");
    let from_payment_links = ["creditcard", "general", "prepaid"].iter().find_map(|k| {
        payment_links
            .and_then(|p| p.get(k))
            .and_then(Value::as_str)
    });

    from_links
        .or(from_payment_links)
        .or_else(|| body.get("checkout_url").and_then(Value::as_str))
        .or_else(|| body.get("redirect_url").and_then(Value::as_str))
        .or_else(|| body.get("url").and_then(Value::as_str))
        .map(str::to_string)
}

/// Pull the transaction status out of a status response
pub fn extract_status(body: &Value) -> Option<String> {
    body.get("status")
        .or_else(|| body.get("transaction_status"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_request_uses_provider_field_names() {
        let config = TestConfig::default();
        let request = SmartTransactionRequest::from_config(&config);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["intent"], "sale");
        assert_eq!(value["merchantRef"], "50001234");
        assert_eq!(value["basket"]["products"][0]["priceOne"], 1000);
        assert_eq!(value["basket"]["products"][0]["articleNumber"], "TEST-001");
        assert_eq!(value["basket_info"]["sum"], 1000);
        assert_eq!(value["contract"]["object"], "general.contracts");
        assert_eq!(
            value["application_context"]["return_urls"]["url_success"],
            "https://example.org/SUCCESS"
        );
        assert_eq!(value["payment_context"]["auto_capture"], true);
    }

    #[test]
    fn checkout_url_from_links_href() {
        let body = json!({
            "id": "STX_1",
            "links": { "checkout": { "href": "https://checkout.example/c/1" } }
        });
        assert_eq!(
            extract_checkout_url(&body).as_deref(),
            Some("https://checkout.example/c/1")
        );
    }

    #[test]
    fn checkout_url_from_payment_links_in_scheme_order() {
        let body = json!({
            "payment_links": {
                "general": "https://checkout.example/general",
                "creditcard": "https://checkout.example/cc"
            }
        });
        assert_eq!(
            extract_checkout_url(&body).as_deref(),
            Some("https://checkout.example/cc")
        );
    }

    #[test]
    fn checkout_url_from_flat_keys() {
        for key in ["checkout_url", "redirect_url", "url"] {
            let body = json!({ key: "https://checkout.example/flat" });
            assert_eq!(
                extract_checkout_url(&body).as_deref(),
                Some("https://checkout.example/flat"),
                "key {key}"
            );
        }
        assert_eq!(extract_checkout_url(&json!({ "id": "STX_1" })), None);
    }

    #[test]
    fn status_from_either_key() {
        assert_eq!(
            extract_status(&json!({ "status": "approved" })).as_deref(),
            Some("approved")
        );
        assert_eq!(
            extract_status(&json!({ "transaction_status": "ok" })).as_deref(),
            Some("ok")
        );
        assert_eq!(extract_status(&json!({})), None);
    }
}
