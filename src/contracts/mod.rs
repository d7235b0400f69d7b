use std::sync::Arc;

use ethers::{
    abi::Token,
    types::{Address, U256},
};

use crate::{
    chain::{Chain, ContractCall},
    error::ChainError,
};

pub mod artifact_loader;
pub mod erc20;
pub mod lending_platform;
pub mod oracle;
pub mod stable_coin;

pub use erc20::{Erc20, TokenSet};
pub use lending_platform::LendingPlatform;
pub use oracle::{Oracle, PriceMethods};
pub use stable_coin::StableCoin;

/// A deployed contract bound to the identity that signs its calls.
#[derive(Clone)]
pub struct ContractHandle {
    chain: Arc<dyn Chain>,
    name: String,
    address: Address,
    signer: Address,
}

impl ContractHandle {
    pub async fn deploy(
        chain: Arc<dyn Chain>,
        signer: Address,
        name: &str,
        constructor_args: Vec<Token>,
    ) -> Result<Self, ChainError> {
        let address = chain.deploy(signer, name, &constructor_args).await?;
        tracing::info!(contract = name, ?address, deployer = ?signer, "contract deployed");
        Ok(ContractHandle {
            chain,
            name: name.to_string(),
            address,
            signer,
        })
    }

    /// Same contract, calls signed by `signer`.
    pub fn connect(&self, signer: Address) -> Self {
        ContractHandle {
            signer,
            ..self.clone()
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    fn contract_call(&self, method: &str, args: Vec<Token>) -> ContractCall {
        ContractCall::new(self.signer, self.address, &self.name, method, args)
    }

    pub async fn send(&self, method: &str, args: Vec<Token>) -> Result<(), ChainError> {
        self.send_with_value(method, args, U256::zero()).await
    }

    pub async fn send_with_value(
        &self,
        method: &str,
        args: Vec<Token>,
        value: U256,
    ) -> Result<(), ChainError> {
        tracing::debug!(contract = %self.name, method, from = ?self.signer, %value, "send");
        let result = self
            .chain
            .send(self.contract_call(method, args).with_value(value))
            .await;
        if let Err(ChainError::Reverted { reason, .. }) = &result {
            tracing::debug!(contract = %self.name, method, %reason, "reverted");
        }
        result
    }

    pub async fn call(&self, method: &str, args: Vec<Token>) -> Result<Vec<Token>, ChainError> {
        tracing::debug!(contract = %self.name, method, "call");
        self.chain.call(self.contract_call(method, args)).await
    }

    pub async fn call_uint(&self, method: &str, args: Vec<Token>) -> Result<U256, ChainError> {
        self.call(method, args)
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| ChainError::Decode(format!("{}.{}", self.name, method)))
    }

    pub async fn call_address(
        &self,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Address, ChainError> {
        self.call(method, args)
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_address)
            .ok_or_else(|| ChainError::Decode(format!("{}.{}", self.name, method)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::LocalChain;

    #[tokio::test]
    async fn test_connect_switches_signer() {
        let chain: Arc<dyn Chain> = Arc::new(LocalChain::new());
        let signers = chain.signers().await.unwrap();
        let handle = ContractHandle::deploy(chain.clone(), signers[0], "Oracle", vec![])
            .await
            .unwrap();
        let other = handle.connect(signers[1]);
        assert_eq!(other.address(), handle.address());
        assert_eq!(other.signer(), signers[1]);
        assert_eq!(handle.signer(), signers[0]);
    }

    #[tokio::test]
    async fn test_decode_mismatch() {
        let chain: Arc<dyn Chain> = Arc::new(LocalChain::new());
        let signers = chain.signers().await.unwrap();
        let handle = ContractHandle::deploy(chain, signers[0], "Oracle", vec![])
            .await
            .unwrap();
        let err = handle.call_uint("owner", vec![]).await.unwrap_err();
        assert!(matches!(err, ChainError::Decode(_)));
    }
}
