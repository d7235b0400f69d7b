use std::env::var;

use ethers::{types::U256, utils::parse_ether};

use crate::{
    constant::{lending_defaults, network, stablecoin_defaults},
    error::ConfigError,
};

pub struct AppConfig {
    pub network: String,
    pub rpc_url: Option<String>,
    pub artifacts_dir: String,
}

impl AppConfig {
    pub fn new() -> AppConfig {
        AppConfig {
            network: var("NETWORK").unwrap_or(network::LOCAL.to_string()),
            rpc_url: var("RPC_URL").ok().filter(|url| !url.is_empty()),
            artifacts_dir: var("ARTIFACTS_DIR")
                .unwrap_or(network::DEFAULT_ARTIFACTS_DIR.to_string()),
        }
    }

    /// Endpoint for a remote profile. `None` means the in-process network.
    pub fn endpoint(&self) -> Result<Option<String>, ConfigError> {
        if let Some(url) = &self.rpc_url {
            return Ok(Some(url.clone()));
        }
        match self.network.as_str() {
            network::LOCAL => Ok(None),
            network::LOCALHOST => Ok(Some(network::LOCALHOST_RPC_URL.to_string())),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableCoinScenario {
    pub initial_price: U256,
    pub deposit_wei: U256,
    pub mint: U256,
    pub over_mint: U256,
    pub withdraw_wei: U256,
    pub burn: U256,
    pub second_deposit_wei: U256,
    pub second_mint: U256,
    pub liquidator_deposit_wei: U256,
    pub liquidator_mint: U256,
    pub crash_price: U256,
}

impl Default for StableCoinScenario {
    fn default() -> Self {
        let ether = |amount: &str| parse_ether(amount).unwrap_or_default();
        StableCoinScenario {
            initial_price: stablecoin_defaults::INITIAL_PRICE.into(),
            deposit_wei: ether(stablecoin_defaults::DEPOSIT_ETHER),
            mint: stablecoin_defaults::MINT.into(),
            over_mint: stablecoin_defaults::OVER_MINT.into(),
            withdraw_wei: ether(stablecoin_defaults::WITHDRAW_ETHER),
            burn: stablecoin_defaults::BURN.into(),
            second_deposit_wei: ether(stablecoin_defaults::SECOND_DEPOSIT_ETHER),
            second_mint: stablecoin_defaults::SECOND_MINT.into(),
            liquidator_deposit_wei: ether(stablecoin_defaults::LIQUIDATOR_DEPOSIT_ETHER),
            liquidator_mint: stablecoin_defaults::LIQUIDATOR_MINT.into(),
            crash_price: stablecoin_defaults::CRASH_PRICE.into(),
        }
    }
}

impl StableCoinScenario {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(StableCoinScenario {
            initial_price: amount_var("STABLECOIN_INITIAL_PRICE", defaults.initial_price)?,
            deposit_wei: ether_var("STABLECOIN_DEPOSIT_ETHER", defaults.deposit_wei)?,
            mint: amount_var("STABLECOIN_MINT", defaults.mint)?,
            over_mint: amount_var("STABLECOIN_OVER_MINT", defaults.over_mint)?,
            withdraw_wei: ether_var("STABLECOIN_WITHDRAW_ETHER", defaults.withdraw_wei)?,
            burn: amount_var("STABLECOIN_BURN", defaults.burn)?,
            second_deposit_wei: ether_var(
                "STABLECOIN_SECOND_DEPOSIT_ETHER",
                defaults.second_deposit_wei,
            )?,
            second_mint: amount_var("STABLECOIN_SECOND_MINT", defaults.second_mint)?,
            liquidator_deposit_wei: ether_var(
                "STABLECOIN_LIQUIDATOR_DEPOSIT_ETHER",
                defaults.liquidator_deposit_wei,
            )?,
            liquidator_mint: amount_var("STABLECOIN_LIQUIDATOR_MINT", defaults.liquidator_mint)?,
            crash_price: amount_var("STABLECOIN_CRASH_PRICE", defaults.crash_price)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingScenario {
    pub price: U256,
    pub stable_deposit: U256,
    pub volatile_transfer: U256,
    pub over_borrow: U256,
    pub borrow: U256,
}

impl Default for LendingScenario {
    fn default() -> Self {
        LendingScenario {
            price: lending_defaults::PRICE.into(),
            stable_deposit: lending_defaults::STABLE_DEPOSIT.into(),
            volatile_transfer: lending_defaults::VOLATILE_TRANSFER.into(),
            over_borrow: lending_defaults::OVER_BORROW.into(),
            borrow: lending_defaults::BORROW.into(),
        }
    }
}

impl LendingScenario {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(LendingScenario {
            price: amount_var("LENDING_PRICE", defaults.price)?,
            stable_deposit: amount_var("LENDING_STABLE_DEPOSIT", defaults.stable_deposit)?,
            volatile_transfer: amount_var("LENDING_VOLATILE_TRANSFER", defaults.volatile_transfer)?,
            over_borrow: amount_var("LENDING_OVER_BORROW", defaults.over_borrow)?,
            borrow: amount_var("LENDING_BORROW", defaults.borrow)?,
        })
    }
}

fn amount_var(key: &str, default: U256) -> Result<U256, ConfigError> {
    match var(key) {
        Ok(raw) => parse_amount(key, &raw),
        Err(_) => Ok(default),
    }
}

fn ether_var(key: &str, default: U256) -> Result<U256, ConfigError> {
    match var(key) {
        Ok(raw) => parse_ether_amount(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_amount(key: &str, raw: &str) -> Result<U256, ConfigError> {
    U256::from_dec_str(raw.trim()).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
        message: e.to_string(),
    })
}

fn parse_ether_amount(key: &str, raw: &str) -> Result<U256, ConfigError> {
    parse_ether(raw.trim()).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stablecoin_scenario() {
        let scenario = StableCoinScenario::default();
        assert_eq!(scenario.initial_price, U256::from(1000));
        assert_eq!(
            scenario.deposit_wei,
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(scenario.mint, U256::from(200));
        assert_eq!(scenario.over_mint, U256::from(3000));
        assert_eq!(scenario.crash_price, U256::from(1));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        let err = parse_amount("LENDING_BORROW", "twenty").unwrap_err();
        assert!(err.to_string().contains("LENDING_BORROW"));
        assert_eq!(parse_amount("LENDING_BORROW", " 20 ").unwrap(), U256::from(20));
    }

    #[test]
    fn test_parse_ether_amount_fractional() {
        let wei = parse_ether_amount("STABLECOIN_DEPOSIT_ETHER", "0.5").unwrap();
        assert_eq!(wei, U256::from(500_000_000_000_000_000u128));
    }

    #[test]
    fn test_endpoint_per_profile() {
        let mut config = AppConfig {
            network: "local".to_string(),
            rpc_url: None,
            artifacts_dir: "artifacts".to_string(),
        };
        assert_eq!(config.endpoint().unwrap(), None);

        config.network = "localhost".to_string();
        assert_eq!(
            config.endpoint().unwrap().as_deref(),
            Some("http://127.0.0.1:8545")
        );

        config.network = "sepolia".to_string();
        assert!(config.endpoint().is_err());

        config.rpc_url = Some("http://node:8545".to_string());
        assert_eq!(config.endpoint().unwrap().as_deref(), Some("http://node:8545"));
    }
}
