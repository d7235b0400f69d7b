use ethers::{
    abi::Token,
    types::{Address, U256},
};

use super::{Deployed, Tx, WorldState};
use crate::{constant::oracle_methods, error::ChainError};

#[derive(Debug, Clone)]
pub(crate) struct OracleState {
    pub owner: Address,
    pub price: U256,
}

impl OracleState {
    pub fn new(owner: Address) -> Self {
        OracleState {
            owner,
            price: U256::zero(),
        }
    }
}

pub(crate) fn invoke(world: &mut WorldState, tx: &Tx) -> Result<Vec<Token>, ChainError> {
    let state = match world.contracts.get_mut(&tx.this) {
        Some(Deployed::Oracle(state)) => state,
        _ => return Err(ChainError::UnknownContract(format!("{:?}", tx.this))),
    };

    match tx.method {
        oracle_methods::eth::SET_PRICE | oracle_methods::generic::SET_PRICE => {
            if tx.from != state.owner {
                return Err(tx.revert("Oracle: caller is not the owner"));
            }
            state.price = tx.uint(0)?;
            Ok(vec![])
        }
        oracle_methods::eth::GET_PRICE | oracle_methods::generic::GET_PRICE => {
            Ok(vec![Token::Uint(state.price)])
        }
        "owner" => Ok(vec![Token::Address(state.owner)]),
        _ => Err(tx.unknown_method("Oracle")),
    }
}
