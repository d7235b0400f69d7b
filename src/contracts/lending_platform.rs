use std::sync::Arc;

use ethers::{
    abi::Token,
    types::{Address, U256},
};

use super::{ContractHandle, TokenSet};
use crate::{chain::Chain, constant::contract, error::ChainError};

#[derive(Clone)]
pub struct LendingPlatform {
    handle: ContractHandle,
}

impl LendingPlatform {
    /// Constructor order is (volatile, stable, lstable, lvolatile).
    pub async fn deploy(
        chain: Arc<dyn Chain>,
        signer: Address,
        tokens: &TokenSet,
    ) -> Result<Self, ChainError> {
        let args = vec![
            Token::Address(tokens.volatile.address()),
            Token::Address(tokens.stable.address()),
            Token::Address(tokens.lstable.address()),
            Token::Address(tokens.lvolatile.address()),
        ];
        let handle =
            ContractHandle::deploy(chain, signer, contract::LENDING_PLATFORM, args).await?;
        Ok(LendingPlatform { handle })
    }

    pub fn connect(&self, signer: Address) -> Self {
        LendingPlatform {
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

    pub async fn deposit_stable(&self, amount: U256) -> Result<(), ChainError> {
        self.handle
            .send("depositStable", vec![Token::Uint(amount)])
            .await
    }

    pub async fn deposit_volatile(&self, amount: U256) -> Result<(), ChainError> {
        self.handle
            .send("depositVolatile", vec![Token::Uint(amount)])
            .await
    }

    pub async fn borrow_stable(&self, amount: U256) -> Result<(), ChainError> {
        self.handle
            .send("borrowStable", vec![Token::Uint(amount)])
            .await
    }

    pub async fn repay_stable(&self, amount: U256) -> Result<(), ChainError> {
        self.handle
            .send("repayStable", vec![Token::Uint(amount)])
            .await
    }

    pub async fn withdraw_stable(&self, amount: U256) -> Result<(), ChainError> {
        self.handle
            .send("withdrawStable", vec![Token::Uint(amount)])
            .await
    }

    pub async fn stable_debt(&self, account: Address) -> Result<U256, ChainError> {
        self.handle
            .call_uint("stableDebt", vec![Token::Address(account)])
            .await
    }
}
