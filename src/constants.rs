use std::time::Duration;

use alloy::primitives::{address, Address};

pub const CLAIM_CONTRACT_ADDRESS: Address = address!("0000000002ba96C69b95E32CAAB8fc38bAB8B3F8");
pub const TOKEN_CONTRACT_ADDRESS: Address = address!("1111111111166b7FE7bd91427724B487980aFc69");

pub const TOKEN_DECIMALS: u8 = 18;
pub const TOKEN_TICKER: &str = "$ZORA";

pub const BASE_EXPLORER_URL: &str = "https://basescan.org";

// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const WALLETS_FILE_PATH: &str = "data/wallets.txt";
pub const FAILED_FILE_PATH: &str = "results/failed.txt";

pub const CLAIM_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const RECEIPT_TIMEOUT: Duration = Duration::from_secs(10);
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

// Safety margins applied on top of eth_estimateGas
pub const CLAIM_GAS_MARGIN: (f64, f64) = (1.4, 1.5);
pub const SEND_GAS_MARGIN: f64 = 1.5;
