//! An EIP-1559 [`rescue_types::ChainGateway`] over a single JSON-RPC
//! endpoint, and a [`rescue_types::PrivateGateway`] fire-and-forget wrapper
//! around the same transport.
//!
//! Corresponds to spec.md §4.1. Unlike the teacher's `Eip155ChainProvider`,
//! this gateway never holds a wallet filler: the Signing Authority signs
//! transactions out of band so the Submission Engine can broadcast the same
//! raw bytes to multiple endpoints in a burst.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types_eth::{BlockId, BlockNumberOrTag, TransactionRequest};
use alloy_transport::TransportError;
use async_trait::async_trait;
use rescue_types::gateway::{BlockHeader, CallParams, ChainGateway, NonceTag, PrivateGateway, Receipt};
use rescue_types::types::{Gas, Value};
use url::Url;

/// Errors surfaced by [`HttpChainGateway`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// RPC transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The endpoint returned no block for a tag that must always resolve.
    #[error("gateway returned no block for tag")]
    MissingBlock,
    /// A receipt wait exceeded `receipt_timeout`.
    #[error("receipt wait for {0} timed out after {1:?}")]
    ReceiptTimeout(B256, Duration),
    /// Gas estimation failed; callers must fall back to a conservative
    /// default (spec.md §4.1).
    #[error("gas estimation failed: {0}")]
    EstimationFailed(String),
}

/// How often [`HttpChainGateway::await_receipt`] polls for a receipt.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long [`HttpChainGateway::await_receipt`] waits before giving up.
const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// A thin client over one JSON-RPC endpoint.
///
/// The same type serves as both the primary gateway (via [`ChainGateway`])
/// and a private broadcast target (via [`PrivateGateway`]): a "private"
/// endpoint is just another HTTP endpoint used in fire-and-forget mode.
#[derive(Debug, Clone)]
pub struct HttpChainGateway {
    provider: RootProvider,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl HttpChainGateway {
    /// Connects to `url`. Does not perform any network I/O itself; the
    /// underlying transport connects lazily on first use.
    #[must_use]
    pub fn new(url: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(url);
        Self {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    /// Overrides the receipt poll interval and timeout (primarily for tests
    /// against a fast local chain).
    #[must_use]
    pub const fn with_receipt_timing(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.receipt_timeout = timeout;
        self
    }
}

#[async_trait]
impl ChainGateway for HttpChainGateway {
    type Error = GatewayError;

    async fn latest_block(&self) -> Result<BlockHeader, Self::Error> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or(GatewayError::MissingBlock)?;
        Ok(BlockHeader {
            number: block.header.number,
            base_fee_per_gas: u128::from(block.header.base_fee_per_gas.unwrap_or_default()),
        })
    }

    async fn chain_id(&self) -> Result<u64, Self::Error> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn nonce_at(&self, address: Address, tag: NonceTag) -> Result<u64, Self::Error> {
        let builder = self.provider.get_transaction_count(address);
        let count = match tag {
            NonceTag::Latest => builder.block_id(BlockId::latest()).await?,
            NonceTag::Pending => builder.block_id(BlockId::pending()).await?,
        };
        Ok(count)
    }

    async fn balance(&self, address: Address) -> Result<Value, Self::Error> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn code(&self, address: Address) -> Result<Bytes, Self::Error> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn estimate_gas(&self, call: CallParams) -> Result<Gas, Self::Error> {
        let request = TransactionRequest::default()
            .from(call.from)
            .to(call.to)
            .input(call.data.into());
        self.provider
            .estimate_gas(request)
            .await
            .map_err(|e| GatewayError::EstimationFailed(e.to_string()))
    }

    async fn submit_raw(&self, raw: &Bytes) -> Result<B256, Self::Error> {
        let pending = self.provider.send_raw_transaction(raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn await_receipt(&self, hash: B256, confirmations: u64) -> Result<Receipt, Self::Error> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                let included_depth = self
                    .provider
                    .get_block_number()
                    .await?
                    .saturating_sub(receipt.block_number.unwrap_or_default())
                    + 1;
                if included_depth >= confirmations {
                    return Ok(Receipt {
                        block_number: receipt.block_number.unwrap_or_default(),
                        gas_used: receipt.gas_used,
                        status: u8::from(receipt.status()),
                    });
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(GatewayError::ReceiptTimeout(hash, self.receipt_timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PrivateGateway for HttpChainGateway {
    async fn broadcast(&self, raw: &Bytes) {
        if let Err(e) = self.provider.send_raw_transaction(raw).await {
            tracing::warn!(tag = "PRIVATE RPC", error = %e, "private gateway broadcast failed, swallowing");
        }
    }
}
