use std::time::Duration;

use alloy::{
    consensus::TxEnvelope,
    primitives::{Address, B256, U256},
    providers::{Provider, RootProvider},
    rpc::{client::ClientBuilder, types::TransactionRequest},
    sol,
    transports::{
        http::Http,
        layers::{RetryBackoffLayer, RetryBackoffService},
    },
};
use async_trait::async_trait;
use tokio::time::Instant;

use crate::constants::{CLAIM_CONTRACT_ADDRESS, RECEIPT_POLL_INTERVAL, TOKEN_CONTRACT_ADDRESS};

sol! {
    #[sol(rpc)]
    contract ClaimDistributor {
        function claimIsOpen() external view returns (bool);
        function accountClaim(address account) external view returns (uint256 allocation, bool claimed);
        function claim(address account) external payable;
    }

    #[sol(rpc)]
    contract IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Allocation and claim status for an address, as reported by the claim contract.
#[derive(Debug, Clone, Copy)]
pub struct AccountClaim {
    pub allocation: U256,
    pub claimed: bool,
}

/// Read/write access to the chain, narrow enough to mock in tests.
///
/// No retries and no caching here; retry policy lives in the workflow.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn gas_price(&self) -> eyre::Result<u128>;

    /// Errors when the simulated call reverts.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> eyre::Result<u64>;

    async fn pending_nonce(&self, address: Address) -> eyre::Result<u64>;

    async fn chain_id(&self) -> eyre::Result<u64>;

    async fn claim_is_open(&self) -> eyre::Result<bool>;

    async fn account_claim(&self, address: Address) -> eyre::Result<AccountClaim>;

    async fn token_balance(&self, address: Address) -> eyre::Result<U256>;

    async fn send_envelope(&self, tx: TxEnvelope) -> eyre::Result<B256>;

    /// Waits for the receipt of `hash`, returning its status. Errors if no
    /// receipt lands within `timeout`.
    async fn wait_for_receipt(&self, hash: B256, timeout: Duration) -> eyre::Result<bool>;
}

pub type HttpTransport = RetryBackoffService<Http<reqwest::Client>>;
pub type HttpProvider = RootProvider<HttpTransport>;

/// `ChainClient` backed by a JSON-RPC endpoint.
pub struct RpcClient {
    provider: HttpProvider,
}

impl RpcClient {
    pub fn connect(rpc_url: &str) -> eyre::Result<Self> {
        let retry_layer = RetryBackoffLayer::new(10, 2, 500);

        let client = ClientBuilder::default()
            .layer(retry_layer)
            .transport(Http::new(rpc_url.parse()?), false);

        Ok(Self {
            provider: RootProvider::new(client),
        })
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn gas_price(&self) -> eyre::Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> eyre::Result<u64> {
        Ok(self.provider.estimate_gas(tx).await?)
    }

    async fn pending_nonce(&self, address: Address) -> eyre::Result<u64> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    async fn chain_id(&self) -> eyre::Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn claim_is_open(&self) -> eyre::Result<bool> {
        let contract = ClaimDistributor::new(CLAIM_CONTRACT_ADDRESS, self.provider.clone());
        Ok(contract.claimIsOpen().call().await?._0)
    }

    async fn account_claim(&self, address: Address) -> eyre::Result<AccountClaim> {
        let contract = ClaimDistributor::new(CLAIM_CONTRACT_ADDRESS, self.provider.clone());
        let response = contract.accountClaim(address).call().await?;

        Ok(AccountClaim {
            allocation: response.allocation,
            claimed: response.claimed,
        })
    }

    async fn token_balance(&self, address: Address) -> eyre::Result<U256> {
        let contract = IERC20::new(TOKEN_CONTRACT_ADDRESS, self.provider.clone());
        Ok(contract.balanceOf(address).call().await?._0)
    }

    async fn send_envelope(&self, tx: TxEnvelope) -> eyre::Result<B256> {
        let pending = self.provider.send_tx_envelope(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: B256, timeout: Duration) -> eyre::Result<bool> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                return Ok(receipt.status());
            }

            if Instant::now() >= deadline {
                eyre::bail!("No receipt for {hash} within {timeout:?}");
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
