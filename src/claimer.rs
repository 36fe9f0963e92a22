use std::{str::FromStr, sync::Arc};

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, B256, U256},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};

use crate::{
    chain::{ChainClient, ClaimDistributor, IERC20},
    config::Config,
    constants::{
        BASE_EXPLORER_URL, CLAIM_CONTRACT_ADDRESS, CLAIM_GAS_MARGIN, CLAIM_POLL_INTERVAL,
        RECEIPT_TIMEOUT, SEND_GAS_MARGIN, TOKEN_CONTRACT_ADDRESS, TOKEN_TICKER,
    },
    retry::RetryPolicy,
    utils::{to_token_units, uniform_jitter, WalletEntry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    AlreadyClaimed,
    NotEligible,
    Eligible(U256),
}

/// Per-wallet workflow state: wait for the claim window, check eligibility,
/// claim, then sweep the balance to the deposit address. Lives for one
/// workflow invocation.
pub struct AccountSession<C> {
    chain: Arc<C>,
    wallet: EthereumWallet,
    address: Address,
    deposit_address: Address,
    /// Populated by the eligibility check; the send phase falls back to a
    /// fresh balance read while this is zero.
    allocation: U256,
    retry: RetryPolicy,
    gas_multiplier: f64,
}

impl<C: ChainClient> AccountSession<C> {
    pub fn new(chain: Arc<C>, entry: &WalletEntry, config: &Config) -> eyre::Result<Self> {
        let signer = PrivateKeySigner::from_str(entry.private_key.trim())?;
        let address = signer.address();
        let deposit_address = Address::from_str(entry.deposit_address.trim())?;

        Ok(Self {
            chain,
            wallet: EthereumWallet::new(signer),
            address,
            deposit_address,
            allocation: U256::ZERO,
            retry: RetryPolicy::new(config.retry_count),
            gas_multiplier: config.gas_multiplier,
        })
    }

    pub async fn run(mut self) -> eyre::Result<()> {
        self.wait_claim_open().await?;

        match self.check_claim_status().await? {
            ClaimStatus::AlreadyClaimed => {
                tracing::info!("{}: Already claimed", self.address);
            }
            ClaimStatus::NotEligible => {
                tracing::error!("{}: not eligible", self.address);
            }
            ClaimStatus::Eligible(allocation) => {
                tracing::info!(
                    "{}: Have {} {TOKEN_TICKER} not claimed yet",
                    self.address,
                    to_token_units(allocation)?
                );
                self.allocation = allocation;

                // Exhausting claim attempts still falls through to the send
                // phase: a claim that landed without a timely receipt, or a
                // balance held before this run, gets swept either way.
                self.claim().await?;
            }
        }

        self.send_tokens().await?;

        Ok(())
    }

    async fn wait_claim_open(&self) -> eyre::Result<()> {
        loop {
            if self.chain.claim_is_open().await? {
                return Ok(());
            }

            tracing::info!("{} | Claim is not open yet", self.address);
            tokio::time::sleep(CLAIM_POLL_INTERVAL).await;
        }
    }

    async fn check_claim_status(&self) -> eyre::Result<ClaimStatus> {
        let claim = self.chain.account_claim(self.address).await?;

        if claim.claimed {
            return Ok(ClaimStatus::AlreadyClaimed);
        }

        let rounded = (to_token_units(claim.allocation)? * 100.0).round() / 100.0;
        if rounded <= 0.0 {
            return Ok(ClaimStatus::NotEligible);
        }

        Ok(ClaimStatus::Eligible(claim.allocation))
    }

    async fn claim(&self) -> eyre::Result<bool> {
        for _ in self.retry.attempts() {
            let gas_margin = uniform_jitter(CLAIM_GAS_MARGIN);
            let input = ClaimDistributor::claimCall {
                account: self.address,
            }
            .abi_encode();

            match self
                .submit(CLAIM_CONTRACT_ADDRESS, input.into(), gas_margin)
                .await
            {
                Ok((hash, true)) => {
                    tracing::info!("[CLAIM] | {} | {BASE_EXPLORER_URL}/tx/{hash}", self.address);
                    return Ok(true);
                }
                Ok((_, false)) => tracing::error!("{} | Claim tx failed", self.address),
                Err(e) => tracing::error!("{} | Claim attempt failed: {e}", self.address),
            }
        }

        Ok(false)
    }

    async fn send_tokens(&self) -> eyre::Result<bool> {
        for _ in self.retry.attempts() {
            let amount = if self.allocation != U256::ZERO {
                self.allocation
            } else {
                self.chain.token_balance(self.address).await?
            };

            if amount == U256::ZERO {
                // Zero balance does not end the loop; the next attempt
                // re-reads the balance in case a claim lands late.
                tracing::info!("{}: No {TOKEN_TICKER} on wallet", self.address);
                continue;
            }

            tracing::info!(
                "{}: Got {} {TOKEN_TICKER}, sending",
                self.address,
                to_token_units(amount)?
            );

            let input = IERC20::transferCall {
                to: self.deposit_address,
                amount,
            }
            .abi_encode();

            match self
                .submit(TOKEN_CONTRACT_ADDRESS, input.into(), SEND_GAS_MARGIN)
                .await
            {
                Ok((hash, true)) => {
                    tracing::info!("[SEND] | {} | {BASE_EXPLORER_URL}/tx/{hash}", self.address);
                    return Ok(true);
                }
                Ok((_, false)) => tracing::error!("{} | Send tx failed", self.address),
                Err(e) => tracing::error!("{} | Send attempt failed: {e}", self.address),
            }
        }

        Ok(false)
    }

    /// Builds, signs and broadcasts one legacy transaction, then waits for
    /// its receipt. Gas price and nonce are fetched fresh on every call so
    /// retries never reuse stale values.
    async fn submit(&self, to: Address, input: Bytes, gas_margin: f64) -> eyre::Result<(B256, bool)> {
        let gas_price = self.chain.gas_price().await?;
        let nonce = self.chain.pending_nonce(self.address).await?;
        let chain_id = self.chain.chain_id().await?;

        let mut tx_request = TransactionRequest::default()
            .with_from(self.address)
            .with_to(to)
            .with_value(U256::ZERO)
            .with_gas_price((gas_price as f64 * self.gas_multiplier) as u128)
            .with_nonce(nonce)
            .with_chain_id(chain_id);
        tx_request.set_input(input);

        let gas_limit = self.chain.estimate_gas(&tx_request).await?;
        tx_request.set_gas_limit((gas_limit as f64 * gas_margin) as u64);

        let signed = tx_request.build(&self.wallet).await?;
        let hash = self.chain.send_envelope(signed).await?;
        let status = self.chain.wait_for_receipt(hash, RECEIPT_TIMEOUT).await?;

        Ok((hash, status))
    }
}
