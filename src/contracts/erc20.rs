use std::sync::Arc;

use ethers::{
    abi::Token,
    types::{Address, U256},
};

use super::ContractHandle;
use crate::{chain::Chain, error::ChainError};

#[derive(Clone)]
pub struct Erc20 {
    handle: ContractHandle,
}

impl Erc20 {
    pub async fn deploy(
        chain: Arc<dyn Chain>,
        signer: Address,
        name: &str,
    ) -> Result<Self, ChainError> {
        let handle = ContractHandle::deploy(chain, signer, name, vec![]).await?;
        Ok(Erc20 { handle })
    }

    pub fn connect(&self, signer: Address) -> Self {
        Erc20 {
            handle: self.handle.connect(signer),
        }
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<(), ChainError> {
        self.handle
            .send(
                "approve",
                vec![Token::Address(spender), Token::Uint(amount)],
            )
            .await
    }

    pub async fn transfer(&self, to: Address, amount: U256) -> Result<(), ChainError> {
        self.handle
            .send("transfer", vec![Token::Address(to), Token::Uint(amount)])
            .await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainError> {
        self.handle
            .call_uint("balanceOf", vec![Token::Address(account)])
            .await
    }
}

/// The four tokens a lending platform is wired to.
#[derive(Clone)]
pub struct TokenSet {
    pub stable: Erc20,
    pub volatile: Erc20,
    pub lstable: Erc20,
    pub lvolatile: Erc20,
}
