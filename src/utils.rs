use std::{path::Path, str::FromStr};

use alloy::{
    primitives::{
        utils::{format_units, UnitsError},
        U256,
    },
    signers::local::PrivateKeySigner,
};
use rand::{thread_rng, Rng};
use tokio::io::AsyncBufReadExt;

use crate::constants::TOKEN_DECIMALS;

/// One `key;deposit_address` line of the wallet list. The raw fields are kept
/// verbatim so a failure record reproduces the input line exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletEntry {
    pub private_key: String,
    pub deposit_address: String,
}

pub async fn read_file_lines(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let file = tokio::fs::read(path).await?;
    let mut lines = file.lines();

    let mut contents = vec![];
    while let Some(line) = lines.next_line().await? {
        contents.push(line);
    }

    Ok(contents)
}

pub fn parse_wallet_line(line: &str) -> Option<WalletEntry> {
    let fields: Vec<&str> = line.split(';').collect();

    if fields.len() != 2 {
        tracing::warn!("Wrong format wallet line, should be key;deposit_address: {line}");
        return None;
    }

    Some(WalletEntry {
        private_key: fields[0].to_string(),
        deposit_address: fields[1].to_string(),
    })
}

pub async fn read_wallet_entries(path: impl AsRef<Path>) -> eyre::Result<Vec<WalletEntry>> {
    let lines = read_file_lines(path).await?;
    Ok(lines.iter().filter_map(|l| parse_wallet_line(l)).collect())
}

/// Raw token amount scaled down by the token's decimals, for display and
/// eligibility rounding. Amounts beyond f64 precision lose precision only
/// here, never in transacted values.
pub fn to_token_units(raw: U256) -> Result<f64, UnitsError> {
    let formatted = format_units(raw, TOKEN_DECIMALS)?;
    Ok(formatted.parse::<f64>().unwrap_or(f64::MAX))
}

pub fn uniform_jitter(range: (f64, f64)) -> f64 {
    thread_rng().gen_range(range.0..=range.1)
}

/// Label for a wallet's log lines: the address derived from its key, so the
/// lines correlate with the per-workflow logs. Falls back to the deposit
/// address when the key does not parse.
pub fn wallet_log_label(entry: &WalletEntry) -> String {
    PrivateKeySigner::from_str(entry.private_key.trim())
        .map(|signer| signer.address().to_string())
        .unwrap_or_else(|_| entry.deposit_address.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let entry = parse_wallet_line("0xdeadbeef;0x52908400098527886E0F7030069857D2E4169EE7");

        assert_eq!(
            entry,
            Some(WalletEntry {
                private_key: "0xdeadbeef".to_string(),
                deposit_address: "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
            })
        );
    }

    #[test]
    fn rejects_lines_without_two_fields() {
        assert_eq!(parse_wallet_line("0xdeadbeef"), None);
        assert_eq!(parse_wallet_line("a;b;c"), None);
        assert_eq!(parse_wallet_line(""), None);
    }

    #[test]
    fn scales_raw_amount_by_decimals() {
        let raw = U256::from(10).pow(U256::from(18)) * U256::from(1000);
        assert_eq!(to_token_units(raw).unwrap(), 1000.0);

        assert_eq!(to_token_units(U256::ZERO).unwrap(), 0.0);
    }

    #[test]
    fn dust_rounds_to_zero_at_two_decimals() {
        let dust = to_token_units(U256::from(1000)).unwrap();
        assert_eq!((dust * 100.0).round() / 100.0, 0.0);
    }

    #[test]
    fn log_label_derives_signer_address_when_key_parses() {
        let entry = WalletEntry {
            private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .to_string(),
            deposit_address: "0x90F79bf6EB2c4f870365E785982E1f101E93b906".to_string(),
        };

        assert_eq!(
            wallet_log_label(&entry),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn log_label_falls_back_to_deposit_address() {
        let entry = WalletEntry {
            private_key: "notakey".to_string(),
            deposit_address: "0xdest".to_string(),
        };

        assert_eq!(wallet_log_label(&entry), "0xdest");
    }

    #[test]
    fn jitter_stays_in_range() {
        for _ in 0..100 {
            let v = uniform_jitter((1.4, 1.5));
            assert!((1.4..=1.5).contains(&v));
        }
    }
}
