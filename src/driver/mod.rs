//! Browser automation driver
//!
//! The runner and page object only consume the [`Browser`]/[`BrowserSession`]
//! seam. The shipped implementation speaks the W3C WebDriver wire protocol
//! against an external chromedriver-style endpoint; tests substitute scripted
//! sessions.

pub mod client;
pub mod types;

pub use client::WebDriverClient;

use std::time::Duration;

use async_trait::async_trait;

use crate::common::Result;

/// Opaque handle to an element located in the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle(pub String);

/// A browser-automation capability that can open sessions
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a new browser session
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// One exclusive browser session
#[async_trait]
pub trait BrowserSession: Send {
    /// Load a URL
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// URL of the current page
    async fn current_url(&mut self) -> Result<String>;

    /// Locate an element by CSS selector
    async fn find(&mut self, selector: &str) -> Result<ElementHandle>;

    /// Clear an input element and type text into it
    async fn fill(&mut self, element: &ElementHandle, text: &str) -> Result<()>;

    /// Click an element
    async fn click(&mut self, element: &ElementHandle) -> Result<()>;

    /// Poll for an element until it appears or the timeout elapses
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<ElementHandle>;

    /// Visible text of the current page body
    async fn page_text(&mut self) -> Result<String>;

    /// End the session, releasing the browser
    async fn close(&mut self) -> Result<()>;
}
