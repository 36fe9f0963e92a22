use serde::Deserialize;
use std::path::Path;

use crate::constants::CONFIG_FILE_PATH;

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub rpc: String,
    pub threads: usize,
    pub retry_count: u32,
    pub gas_multiplier: f64,
    pub delay_accs: [f64; 2],
    pub to_shuffle: bool,
}

impl Config {
    async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&cfg_str)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn read_default() -> Self {
        Self::read_from_file(CONFIG_FILE_PATH)
            .await
            .expect("Default config to be valid")
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.threads < 1 {
            eyre::bail!("THREADS must be at least 1");
        }
        if self.retry_count < 1 {
            eyre::bail!("RETRY_COUNT must be at least 1");
        }
        if self.gas_multiplier <= 1.0 {
            eyre::bail!("GAS_MULTIPLIER must be greater than 1.0");
        }
        let [min, max] = self.delay_accs;
        if min < 0.0 || min > max {
            eyre::bail!("DELAY_ACCS must be a non-negative [min, max] range");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        RPC = "https://base-rpc.publicnode.com"
        THREADS = 10
        RETRY_COUNT = 5
        GAS_MULTIPLIER = 1.5
        DELAY_ACCS = [10.0, 30.0]
        TO_SHUFFLE = true
    "#;

    #[test]
    fn parses_valid_config() {
        let config: Config = toml::from_str(VALID).unwrap();
        config.validate().unwrap();

        assert_eq!(config.threads, 10);
        assert_eq!(config.retry_count, 5);
        assert_eq!(config.delay_accs, [10.0, 30.0]);
        assert!(config.to_shuffle);
    }

    #[test]
    fn rejects_zero_threads() {
        let mut config: Config = toml::from_str(VALID).unwrap();
        config.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_gas_multiplier_at_or_below_one() {
        let mut config: Config = toml::from_str(VALID).unwrap();
        config.gas_multiplier = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_delay_range() {
        let mut config: Config = toml::from_str(VALID).unwrap();
        config.delay_accs = [30.0, 10.0];
        assert!(config.validate().is_err());
    }
}
