use std::collections::HashMap;

use ethers::{
    abi::Token,
    types::{Address, U256},
    utils::WEI_IN_ETHER,
};

use super::{checked_add, Deployed, Tx, WorldState};
use crate::error::ChainError;

/// ETH-collateralised debt token. Balances carry no decimals; collateral is
/// held in wei and valued at the oracle price (USD per ETH).
#[derive(Debug, Clone)]
pub(crate) struct StableCoinState {
    pub owner: Address,
    pub oracle: Address,
    pub collateral_ratio_percent: U256,
    pub collateral: HashMap<Address, U256>,
    pub debt: HashMap<Address, U256>,
    pub balances: HashMap<Address, U256>,
    pub total_supply: U256,
}

impl StableCoinState {
    pub fn new(owner: Address, collateral_ratio_percent: U256) -> Self {
        StableCoinState {
            owner,
            oracle: Address::zero(),
            collateral_ratio_percent,
            collateral: HashMap::new(),
            debt: HashMap::new(),
            balances: HashMap::new(),
            total_supply: U256::zero(),
        }
    }

    fn collateral_of(&self, account: Address) -> U256 {
        self.collateral.get(&account).copied().unwrap_or_default()
    }

    fn debt_of(&self, account: Address) -> U256 {
        self.debt.get(&account).copied().unwrap_or_default()
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn is_healthy(&self, collateral_wei: U256, debt: U256, price: U256) -> bool {
        let value = collateral_wei.saturating_mul(price) / WEI_IN_ETHER;
        value.saturating_mul(100.into()) >= debt.saturating_mul(self.collateral_ratio_percent)
    }
}

pub(crate) fn is_payable(method: &str) -> bool {
    method == "deposit"
}

const NAME: &str = "StableCoin";

fn state_mut<'a>(
    world: &'a mut WorldState,
    tx: &Tx,
) -> Result<&'a mut StableCoinState, ChainError> {
    match world.contracts.get_mut(&tx.this) {
        Some(Deployed::StableCoin(state)) => Ok(state),
        _ => Err(ChainError::UnknownContract(format!("{:?}", tx.this))),
    }
}

fn price(world: &WorldState, tx: &Tx) -> Result<U256, ChainError> {
    let oracle = match world.contracts.get(&tx.this) {
        Some(Deployed::StableCoin(state)) => state.oracle,
        _ => return Err(ChainError::UnknownContract(format!("{:?}", tx.this))),
    };
    if oracle.is_zero() {
        return Err(tx.revert("StableCoin: oracle not registered"));
    }
    world.oracle_price(oracle, tx.method)
}

pub(crate) fn invoke(world: &mut WorldState, tx: &Tx) -> Result<Vec<Token>, ChainError> {
    match tx.method {
        "registerOracle" => {
            let oracle = tx.address(0)?;
            let state = state_mut(world, tx)?;
            if tx.from != state.owner {
                return Err(tx.revert("StableCoin: caller is not the owner"));
            }
            state.oracle = oracle;
            Ok(vec![])
        }
        "oracle" => Ok(vec![Token::Address(state_mut(world, tx)?.oracle)]),
        "collateralETH" => {
            let account = tx.address(0)?;
            Ok(vec![Token::Uint(state_mut(world, tx)?.collateral_of(account))])
        }
        "balanceOf" => {
            let account = tx.address(0)?;
            Ok(vec![Token::Uint(state_mut(world, tx)?.balance_of(account))])
        }
        "totalSupply" => Ok(vec![Token::Uint(state_mut(world, tx)?.total_supply)]),
        "deposit" => {
            if tx.value.is_zero() {
                return Err(tx.revert("StableCoin: deposit must be positive"));
            }
            let state = state_mut(world, tx)?;
            let collateral = state.collateral_of(tx.from);
            let collateral = checked_add(collateral, tx.value, tx.method, NAME)?;
            state.collateral.insert(tx.from, collateral);
            Ok(vec![])
        }
        "mint" => {
            let amount = tx.uint(0)?;
            let price = price(world, tx)?;
            let state = state_mut(world, tx)?;
            let debt = checked_add(state.debt_of(tx.from), amount, tx.method, NAME)?;
            if !state.is_healthy(state.collateral_of(tx.from), debt, price) {
                return Err(tx.revert("StableCoin: insufficient collateral"));
            }
            let balance = checked_add(state.balance_of(tx.from), amount, tx.method, NAME)?;
            let total_supply = checked_add(state.total_supply, amount, tx.method, NAME)?;
            state.debt.insert(tx.from, debt);
            state.balances.insert(tx.from, balance);
            state.total_supply = total_supply;
            Ok(vec![])
        }
        "burn" => {
            let amount = tx.uint(0)?;
            let state = state_mut(world, tx)?;
            let balance = state.balance_of(tx.from);
            if balance < amount {
                return Err(tx.revert("StableCoin: burn amount exceeds balance"));
            }
            let debt = state.debt_of(tx.from);
            state.balances.insert(tx.from, balance - amount);
            state.debt.insert(tx.from, debt - debt.min(amount));
            state.total_supply -= amount;
            Ok(vec![])
        }
        "withdraw" => {
            let amount = tx.uint(0)?;
            let price = price(world, tx)?;
            let state = state_mut(world, tx)?;
            let collateral = state.collateral_of(tx.from);
            if collateral < amount {
                return Err(tx.revert("StableCoin: insufficient collateral"));
            }
            if !state.is_healthy(collateral - amount, state.debt_of(tx.from), price) {
                return Err(tx.revert(
                    "StableCoin: withdrawal would leave position undercollateralized",
                ));
            }
            state.collateral.insert(tx.from, collateral - amount);
            world.transfer_native(tx.this, tx.from, amount, tx.method)?;
            Ok(vec![])
        }
        "liquidate" => {
            let user = tx.address(0)?;
            let price = price(world, tx)?;
            let state = state_mut(world, tx)?;
            let debt = state.debt_of(user);
            let collateral = state.collateral_of(user);
            if debt.is_zero() {
                return Err(tx.revert("StableCoin: nothing to liquidate"));
            }
            if state.is_healthy(collateral, debt, price) {
                return Err(tx.revert("StableCoin: position is healthy"));
            }
            let balance = state.balance_of(tx.from);
            if balance < debt {
                return Err(tx.revert("StableCoin: insufficient balance to cover debt"));
            }
            state.balances.insert(tx.from, balance - debt);
            state.total_supply -= debt;
            state.debt.remove(&user);
            state.collateral.remove(&user);
            world.transfer_native(tx.this, tx.from, collateral, tx.method)?;
            Ok(vec![])
        }
        _ => Err(tx.unknown_method(NAME)),
    }
}
