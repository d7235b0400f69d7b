use std::sync::Arc;

use ethers::types::Address;

use crate::{
    chain::Chain,
    constant::contract,
    contracts::{Erc20, TokenSet},
    error::ChainError,
};

/// Deploys the two receipt tokens and the two underlying tokens, in that order.
pub async fn deploy_tokens(
    chain: Arc<dyn Chain>,
    deployer: Address,
) -> Result<TokenSet, ChainError> {
    let lstable = Erc20::deploy(chain.clone(), deployer, contract::LSTABLE).await?;
    let lvolatile = Erc20::deploy(chain.clone(), deployer, contract::LVOLATILE).await?;
    let stable = Erc20::deploy(chain.clone(), deployer, contract::STABLE).await?;
    let volatile = Erc20::deploy(chain, deployer, contract::VOLATILE).await?;

    Ok(TokenSet {
        stable,
        volatile,
        lstable,
        lvolatile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::LocalChain;
    use ethers::types::U256;

    #[tokio::test]
    async fn test_deploy_tokens_distinct_addresses() {
        let chain: Arc<dyn Chain> = Arc::new(LocalChain::new());
        let deployer = chain.signers().await.unwrap()[0];
        let tokens = deploy_tokens(chain, deployer).await.unwrap();

        let mut addresses = vec![
            tokens.stable.address(),
            tokens.volatile.address(),
            tokens.lstable.address(),
            tokens.lvolatile.address(),
        ];
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), 4);
        assert_eq!(tokens.stable.name(), "Stable");
        assert_eq!(
            tokens.volatile.balance_of(deployer).await.unwrap(),
            U256::from(1_000_000)
        );
        assert_eq!(tokens.lvolatile.balance_of(deployer).await.unwrap(), U256::zero());
    }
}
