//! WebDriver wire-protocol client
//!
//! Talks JSON-over-HTTP to a chromedriver-style endpoint. One
//! [`WebDriverClient`] can open sessions; each [`WebDriverSession`] owns one
//! remote browser session until `close`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::common::config::WebDriverSettings;
use crate::common::{Error, Result};

use super::types::{parse_element, NewSessionValue, WireError, NO_SUCH_ELEMENT};
use super::{Browser, BrowserSession, ElementHandle};

/// Interval between find attempts inside `wait_for`
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Factory for WebDriver sessions against one endpoint
pub struct WebDriverClient {
    endpoint: String,
    headless: bool,
    http: reqwest::Client,
}

impl WebDriverClient {
    pub fn new(settings: &WebDriverSettings, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            endpoint: settings.url.trim_end_matches('/').to_string(),
            headless: settings.headless,
            http,
        })
    }

    fn session_request(&self) -> Value {
        let mut args = vec![
            "--disable-gpu".to_string(),
            "--disable-notifications".to_string(),
            "--window-size=1280,1024".to_string(),
        ];
        if self.headless {
            args.insert(0, "--headless=new".to_string());
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

#[async_trait]
impl Browser for WebDriverClient {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let url = format!("{}/session", self.endpoint);

        let response = self
            .http
            .post(&url)
            .json(&self.session_request())
            .send()
            .await
            .map_err(|e| Error::SessionStart {
                endpoint: self.endpoint.clone(),
                cause: e.to_string(),
            })?;

        let value = unwrap_value("new session", response)
            .await
            .map_err(|e| Error::SessionStart {
                endpoint: self.endpoint.clone(),
                cause: e.to_string(),
            })?;

        let session: NewSessionValue = serde_json::from_value(value)
            .map_err(|e| Error::DriverProtocol(format!("Invalid new-session response: {e}")))?;

        tracing::debug!(session = %session.session_id, "WebDriver session started");

        Ok(Box::new(WebDriverSession {
            base: format!("{}/session/{}", self.endpoint, session.session_id),
            http: self.http.clone(),
        }))
    }
}

/// One live WebDriver session
pub struct WebDriverSession {
    base: String,
    http: reqwest::Client,
}

impl WebDriverSession {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        command: &str,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base, path);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        unwrap_value(command, response).await
    }
}

/// Unwrap the `value` of a WebDriver response, mapping wire errors
async fn unwrap_value(command: &str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| Error::DriverProtocol(format!("Invalid JSON from '{command}': {e}")))?;

    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let wire: WireError = serde_json::from_value(value).unwrap_or_else(|_| WireError {
        error: "unknown error".to_string(),
        message: body.to_string(),
    });

    Err(match wire.error.as_str() {
        NO_SUCH_ELEMENT => Error::ElementNotFound {
            what: command.to_string(),
        },
        _ => Error::driver_command(command, &format!("{}: {}", wire.error, wire.message)),
    })
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.execute(Method::POST, "/url", Some(json!({ "url": url })), "navigate")
            .await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        let value = self.execute(Method::GET, "/url", None, "current url").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::DriverProtocol(format!("Non-string current url: {value}")))
    }

    async fn find(&mut self, selector: &str) -> Result<ElementHandle> {
        let value = self
            .execute(
                Method::POST,
                "/element",
                Some(json!({ "using": "css selector", "value": selector })),
                selector,
            )
            .await?;

        parse_element(&value)
            .ok_or_else(|| Error::DriverProtocol(format!("No element reference in: {value}")))
    }

    async fn fill(&mut self, element: &ElementHandle, text: &str) -> Result<()> {
        let ElementHandle(id) = element;
        self.execute(
            Method::POST,
            &format!("/element/{id}/clear"),
            Some(json!({})),
            "clear",
        )
        .await?;
        self.execute(
            Method::POST,
            &format!("/element/{id}/value"),
            Some(json!({ "text": text })),
            "send keys",
        )
        .await?;
        Ok(())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        let ElementHandle(id) = element;
        self.execute(
            Method::POST,
            &format!("/element/{id}/click"),
            Some(json!({})),
            "click",
        )
        .await?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<ElementHandle> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            match self.find(selector).await {
                Ok(element) => return Ok(element),
                Err(Error::ElementNotFound { .. }) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(Error::WaitTimeout {
                            what: format!("selector '{selector}'"),
                            elapsed_secs: timeout.as_secs(),
                        });
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn page_text(&mut self) -> Result<String> {
        let ElementHandle(id) = self.find("body").await?;
        let value = self
            .execute(Method::GET, &format!("/element/{id}/text"), None, "element text")
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::DriverProtocol(format!("Non-string element text: {value}")))
    }

    async fn close(&mut self) -> Result<()> {
        self.execute(Method::DELETE, "", None, "delete session")
            .await?;
        Ok(())
    }
}
