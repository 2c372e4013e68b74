//! Provider REST API client
//!
//! Provisions the checkout session before any browser work: OAuth
//! client-credentials auth, Smart Transaction creation, and final status
//! lookup.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use async_trait::async_trait;

use crate::common::config::Credentials;
use crate::common::Result;

/// Provisioning operations the runner needs from the provider API
///
/// [`ApiClient`] is the production implementation; tests substitute scripted
/// ones.
#[async_trait]
pub trait Provision: Send {
    /// Authenticate with the client-credentials grant
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()>;

    /// Create the Smart Transaction and extract its hosted checkout URL
    async fn create_transaction(
        &self,
        request: &SmartTransactionRequest,
    ) -> Result<CreatedTransaction>;

    /// Fetch the current status of a transaction
    async fn transaction_status(&self, transaction_id: &str) -> Result<String>;
}
