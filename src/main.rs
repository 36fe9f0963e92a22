use std::sync::Arc;

use rand::{seq::SliceRandom, thread_rng};

use zora_claimer::{
    chain::RpcClient,
    config::Config,
    constants::{FAILED_FILE_PATH, WALLETS_FILE_PATH},
    dispatcher::process_accounts,
    logger::init_default_logger,
    recorder::FailureLog,
    utils::read_wallet_entries,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _guard = init_default_logger();

    let config = Config::read_default().await;

    let chain = Arc::new(RpcClient::connect(&config.rpc)?);

    let mut entries = read_wallet_entries(WALLETS_FILE_PATH).await?;
    if config.to_shuffle {
        entries.shuffle(&mut thread_rng());
    }

    let failures = Arc::new(FailureLog::new(FAILED_FILE_PATH));

    process_accounts(chain, entries, Arc::new(config), failures).await;

    Ok(())
}
