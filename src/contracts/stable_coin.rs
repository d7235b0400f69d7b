use std::sync::Arc;

use ethers::{
    abi::Token,
    types::{Address, U256},
};

use super::ContractHandle;
use crate::{chain::Chain, constant::contract, error::ChainError};

#[derive(Clone)]
pub struct StableCoin {
    handle: ContractHandle,
}

impl StableCoin {
    pub async fn deploy(chain: Arc<dyn Chain>, signer: Address) -> Result<Self, ChainError> {
        let handle = ContractHandle::deploy(chain, signer, contract::STABLE_COIN, vec![]).await?;
        Ok(StableCoin { handle })
    }

    pub fn connect(&self, signer: Address) -> Self {
        StableCoin {
            handle: self.handle.connect(signer),
        }
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub async fn register_oracle(&self, oracle: Address) -> Result<(), ChainError> {
        self.handle
            .send("registerOracle", vec![Token::Address(oracle)])
            .await
    }

    pub async fn oracle(&self) -> Result<Address, ChainError> {
        self.handle.call_address("oracle", vec![]).await
    }

    pub async fn deposit(&self, wei: U256) -> Result<(), ChainError> {
        self.handle.send_with_value("deposit", vec![], wei).await
    }

    pub async fn collateral_of(&self, account: Address) -> Result<U256, ChainError> {
        self.handle
            .call_uint("collateralETH", vec![Token::Address(account)])
            .await
    }

    pub async fn mint(&self, amount: U256) -> Result<(), ChainError> {
        self.handle.send("mint", vec![Token::Uint(amount)]).await
    }

    pub async fn burn(&self, amount: U256) -> Result<(), ChainError> {
        self.handle.send("burn", vec![Token::Uint(amount)]).await
    }

    pub async fn withdraw(&self, wei: U256) -> Result<(), ChainError> {
        self.handle.send("withdraw", vec![Token::Uint(wei)]).await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainError> {
        self.handle
            .call_uint("balanceOf", vec![Token::Address(account)])
            .await
    }

    pub async fn liquidate(&self, user: Address) -> Result<(), ChainError> {
        self.handle
            .send("liquidate", vec![Token::Address(user)])
            .await
    }
}
