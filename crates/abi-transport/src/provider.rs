//! Provider abstraction.
//!
//! Lets invocations be submitted or dry-run against different backends (a
//! remote node, an in-memory mock) without coupling the call layer to one of
//! them. These are the only suspension points of a call.

use anyhow::{bail, Result};

use abi_call_types::{CallResult, ChainId, TransactionRequest, TransactionResponse};

/// Unified interface for transaction backends.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Submit a transaction and wait for its outcome.
    async fn submit(&self, request: &TransactionRequest) -> Result<TransactionResponse>;

    /// Execute a transaction without committing it.
    async fn simulate(&self, request: &TransactionRequest) -> Result<CallResult>;

    /// Chain id of the network this provider talks to.
    fn chain_id(&self) -> ChainId;

    fn network_name(&self) -> &str {
        "unknown"
    }
}

/// Placeholder used when no provider has been attached. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvider {
    chain_id: ChainId,
}

impl NoopProvider {
    pub fn new(chain_id: ChainId) -> Self {
        Self { chain_id }
    }
}

#[async_trait::async_trait]
impl Provider for NoopProvider {
    async fn submit(&self, _request: &TransactionRequest) -> Result<TransactionResponse> {
        bail!("no provider configured: cannot submit transaction")
    }

    async fn simulate(&self, _request: &TransactionRequest) -> Result<CallResult> {
        bail!("no provider configured: cannot simulate transaction")
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn network_name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_call_types::TxPolicies;

    fn empty_request() -> TransactionRequest {
        TransactionRequest {
            script_data: vec![],
            segments: vec![],
            inputs: vec![],
            outputs: vec![],
            policies: TxPolicies::default(),
        }
    }

    #[tokio::test]
    async fn test_noop_provider_refuses_work() {
        let provider = NoopProvider::new(ChainId::new(7));
        assert_eq!(provider.chain_id(), ChainId::new(7));

        let err = provider.simulate(&empty_request()).await.unwrap_err();
        assert!(err.to_string().contains("no provider configured"));
        assert!(provider.submit(&empty_request()).await.is_err());
    }
}
