use std::{sync::Arc, time::Duration};

use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    chain::ChainClient,
    claimer::AccountSession,
    config::Config,
    recorder::FailureLog,
    utils::{uniform_jitter, wallet_log_label, WalletEntry},
};

/// Runs the claim workflow for every wallet with at most `THREADS` in flight.
///
/// A worker slot is held through the post-wallet jitter sleep, so throughput
/// is throttled as well as bounded. Failed workflows land in the failure log;
/// nothing cancels the rest of the batch.
pub async fn process_accounts<C>(
    chain: Arc<C>,
    entries: Vec<WalletEntry>,
    config: Arc<Config>,
    failures: Arc<FailureLog>,
) where
    C: ChainClient + 'static,
{
    let semaphore = Arc::new(Semaphore::new(config.threads));
    let mut handles = JoinSet::new();

    for entry in entries {
        let chain = chain.clone();
        let config = config.clone();
        let failures = failures.clone();
        let semaphore = semaphore.clone();

        handles.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("Semaphore is never closed");

            if let Err(e) = run_account(chain, &entry, &config).await {
                tracing::error!("{} | Error: {e}", wallet_log_label(&entry));

                if let Err(e) = failures
                    .record(&entry.private_key, &entry.deposit_address)
                    .await
                {
                    tracing::error!("Failed to write failure record: {e}");
                }
            }

            let to_sleep = uniform_jitter((config.delay_accs[0], config.delay_accs[1]));
            tracing::info!("Sleep {to_sleep:.2} sec");
            tokio::time::sleep(Duration::from_secs_f64(to_sleep)).await;
        });
    }

    while let Some(res) = handles.join_next().await {
        if let Err(e) = res {
            tracing::error!("Worker task panicked: {e}");
        }
    }
}

async fn run_account<C: ChainClient>(
    chain: Arc<C>,
    entry: &WalletEntry,
    config: &Config,
) -> eyre::Result<()> {
    let session = AccountSession::new(chain, entry, config)?;
    session.run().await
}
