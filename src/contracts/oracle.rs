use std::sync::Arc;

use ethers::{
    abi::Token,
    types::{Address, U256},
};

use super::ContractHandle;
use crate::{
    chain::Chain,
    constant::{contract, oracle_methods},
    error::ChainError,
};

/// Setter/getter pair exposed by a particular Oracle build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceMethods {
    pub set: &'static str,
    pub get: &'static str,
}

impl PriceMethods {
    pub const ETH: PriceMethods = PriceMethods {
        set: oracle_methods::eth::SET_PRICE,
        get: oracle_methods::eth::GET_PRICE,
    };
    pub const GENERIC: PriceMethods = PriceMethods {
        set: oracle_methods::generic::SET_PRICE,
        get: oracle_methods::generic::GET_PRICE,
    };
}

#[derive(Clone)]
pub struct Oracle {
    handle: ContractHandle,
    methods: PriceMethods,
}

impl Oracle {
    pub async fn deploy(
        chain: Arc<dyn Chain>,
        signer: Address,
        methods: PriceMethods,
    ) -> Result<Self, ChainError> {
        let handle = ContractHandle::deploy(chain, signer, contract::ORACLE, vec![]).await?;
        Ok(Oracle { handle, methods })
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub async fn set_price(&self, price: U256) -> Result<(), ChainError> {
        self.handle
            .send(self.methods.set, vec![Token::Uint(price)])
            .await
    }

    pub async fn price(&self) -> Result<U256, ChainError> {
        self.handle.call_uint(self.methods.get, vec![]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::LocalChain;

    #[tokio::test]
    async fn test_price_round_trip_both_builds() {
        let chain: Arc<dyn Chain> = Arc::new(LocalChain::new());
        let owner = chain.signers().await.unwrap()[0];

        let eth = Oracle::deploy(chain.clone(), owner, PriceMethods::ETH).await.unwrap();
        eth.set_price(1000.into()).await.unwrap();
        assert_eq!(eth.price().await.unwrap(), U256::from(1000));

        let generic = Oracle::deploy(chain, owner, PriceMethods::GENERIC).await.unwrap();
        assert_eq!(generic.price().await.unwrap(), U256::zero());
        generic.set_price(42.into()).await.unwrap();
        assert_eq!(generic.price().await.unwrap(), U256::from(42));
    }

    #[tokio::test]
    async fn test_only_owner_sets_price() {
        let chain: Arc<dyn Chain> = Arc::new(LocalChain::new());
        let signers = chain.signers().await.unwrap();
        let oracle = Oracle::deploy(chain, signers[0], PriceMethods::ETH).await.unwrap();
        let stranger = Oracle {
            handle: oracle.handle.connect(signers[1]),
            methods: PriceMethods::ETH,
        };
        let err = stranger.set_price(1.into()).await.unwrap_err();
        assert!(err.is_revert());
    }
}
