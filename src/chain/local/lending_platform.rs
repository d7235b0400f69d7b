use std::collections::HashMap;

use ethers::{
    abi::Token,
    types::{Address, U256},
};

use super::{checked_add, Deployed, Tx, WorldState};
use crate::error::ChainError;

#[derive(Debug, Clone)]
pub(crate) struct LendingState {
    pub owner: Address,
    pub volatile: Address,
    pub stable: Address,
    pub lstable: Address,
    pub lvolatile: Address,
    pub oracle: Address,
    pub collateral_ratio_percent: U256,
    pub stable_deposits: HashMap<Address, U256>,
    pub volatile_deposits: HashMap<Address, U256>,
    pub stable_debt: HashMap<Address, U256>,
}

impl LendingState {
    pub fn new(
        owner: Address,
        volatile: Address,
        stable: Address,
        lstable: Address,
        lvolatile: Address,
        collateral_ratio_percent: U256,
    ) -> Self {
        LendingState {
            owner,
            volatile,
            stable,
            lstable,
            lvolatile,
            oracle: Address::zero(),
            collateral_ratio_percent,
            stable_deposits: HashMap::new(),
            volatile_deposits: HashMap::new(),
            stable_debt: HashMap::new(),
        }
    }

    fn get(map: &HashMap<Address, U256>, account: Address) -> U256 {
        map.get(&account).copied().unwrap_or_default()
    }

    /// Stable deposits count at face value, volatile ones at the oracle price.
    fn borrowing_power(&self, account: Address, price: U256) -> U256 {
        Self::get(&self.stable_deposits, account)
            .saturating_add(Self::get(&self.volatile_deposits, account).saturating_mul(price))
    }

    fn is_covered(&self, account: Address, debt: U256, price: U256) -> bool {
        let power = self.borrowing_power(account, price);
        power.saturating_mul(100.into()) >= debt.saturating_mul(self.collateral_ratio_percent)
    }
}

fn state<'a>(world: &'a WorldState, tx: &Tx) -> Result<&'a LendingState, ChainError> {
    match world.contracts.get(&tx.this) {
        Some(Deployed::LendingPlatform(state)) => Ok(state),
        _ => Err(ChainError::UnknownContract(format!("{:?}", tx.this))),
    }
}

const NAME: &str = "LendingPlatform";

fn state_mut<'a>(
    world: &'a mut WorldState,
    tx: &Tx,
) -> Result<&'a mut LendingState, ChainError> {
    match world.contracts.get_mut(&tx.this) {
        Some(Deployed::LendingPlatform(state)) => Ok(state),
        _ => Err(ChainError::UnknownContract(format!("{:?}", tx.this))),
    }
}

fn price(world: &WorldState, tx: &Tx) -> Result<U256, ChainError> {
    let oracle = state(world, tx)?.oracle;
    if oracle.is_zero() {
        return Err(tx.revert("LendingPlatform: oracle not registered"));
    }
    world.oracle_price(oracle, tx.method)
}

/// Pulls `amount` of `underlying` from the caller and mints the same amount of `receipt`.
fn deposit(
    world: &mut WorldState,
    tx: &Tx,
    underlying: Address,
    receipt: Address,
) -> Result<U256, ChainError> {
    let amount = tx.uint(0)?;
    if amount.is_zero() {
        return Err(tx.revert("LendingPlatform: amount must be positive"));
    }
    world
        .token_mut(underlying, tx.method)?
        .transfer_from(tx.this, tx.from, tx.this, amount, tx.method)?;
    world
        .token_mut(receipt, tx.method)?
        .mint(tx.from, amount, tx.method)?;
    Ok(amount)
}

/// Burns `amount` of `receipt` from the caller and returns the underlying.
fn withdraw(
    world: &mut WorldState,
    tx: &Tx,
    underlying: Address,
    receipt: Address,
) -> Result<U256, ChainError> {
    let amount = tx.uint(0)?;
    world
        .token_mut(receipt, tx.method)?
        .burn(tx.from, amount, tx.method)?;
    world
        .token_mut(underlying, tx.method)?
        .transfer(tx.this, tx.from, amount, tx.method)?;
    Ok(amount)
}

pub(crate) fn invoke(world: &mut WorldState, tx: &Tx) -> Result<Vec<Token>, ChainError> {
    match tx.method {
        "registerOracle" => {
            let oracle = tx.address(0)?;
            let state = state_mut(world, tx)?;
            if tx.from != state.owner {
                return Err(tx.revert("LendingPlatform: caller is not the owner"));
            }
            state.oracle = oracle;
            Ok(vec![])
        }
        "oracle" => Ok(vec![Token::Address(state(world, tx)?.oracle)]),
        "stableDebt" => {
            let account = tx.address(0)?;
            Ok(vec![Token::Uint(LendingState::get(
                &state(world, tx)?.stable_debt,
                account,
            ))])
        }
        "depositStable" => {
            let (stable, lstable) = {
                let state = state(world, tx)?;
                (state.stable, state.lstable)
            };
            let amount = deposit(world, tx, stable, lstable)?;
            let state = state_mut(world, tx)?;
            let deposited = LendingState::get(&state.stable_deposits, tx.from);
            let deposited = checked_add(deposited, amount, tx.method, NAME)?;
            state.stable_deposits.insert(tx.from, deposited);
            Ok(vec![])
        }
        "depositVolatile" => {
            let (volatile, lvolatile) = {
                let state = state(world, tx)?;
                (state.volatile, state.lvolatile)
            };
            let amount = deposit(world, tx, volatile, lvolatile)?;
            let state = state_mut(world, tx)?;
            let deposited = LendingState::get(&state.volatile_deposits, tx.from);
            let deposited = checked_add(deposited, amount, tx.method, NAME)?;
            state.volatile_deposits.insert(tx.from, deposited);
            Ok(vec![])
        }
        "withdrawStable" => {
            let amount = tx.uint(0)?;
            let price = price(world, tx)?;
            let (stable, lstable) = {
                let state = state_mut(world, tx)?;
                let deposited = LendingState::get(&state.stable_deposits, tx.from);
                if deposited < amount {
                    return Err(tx.revert("LendingPlatform: withdrawal exceeds deposit"));
                }
                state.stable_deposits.insert(tx.from, deposited - amount);
                let debt = LendingState::get(&state.stable_debt, tx.from);
                if !state.is_covered(tx.from, debt, price) {
                    return Err(tx.revert(
                        "LendingPlatform: withdrawal would leave position undercollateralized",
                    ));
                }
                (state.stable, state.lstable)
            };
            withdraw(world, tx, stable, lstable)?;
            Ok(vec![])
        }
        "borrowStable" => {
            let amount = tx.uint(0)?;
            let price = price(world, tx)?;
            let stable = {
                let state = state(world, tx)?;
                let debt = LendingState::get(&state.stable_debt, tx.from);
                let debt = checked_add(debt, amount, tx.method, NAME)?;
                if !state.is_covered(tx.from, debt, price) {
                    return Err(tx.revert("LendingPlatform: insufficient collateral"));
                }
                state.stable
            };
            let liquidity = world.token(stable, tx.method)?.balance_of(tx.this);
            if liquidity < amount {
                return Err(tx.revert("LendingPlatform: insufficient liquidity"));
            }
            world
                .token_mut(stable, tx.method)?
                .transfer(tx.this, tx.from, amount, tx.method)?;
            let state = state_mut(world, tx)?;
            let debt = LendingState::get(&state.stable_debt, tx.from);
            let debt = checked_add(debt, amount, tx.method, NAME)?;
            state.stable_debt.insert(tx.from, debt);
            Ok(vec![])
        }
        "repayStable" => {
            let amount = tx.uint(0)?;
            let (stable, debt) = {
                let state = state(world, tx)?;
                (state.stable, LendingState::get(&state.stable_debt, tx.from))
            };
            if amount > debt {
                return Err(tx.revert("LendingPlatform: repay exceeds debt"));
            }
            world
                .token_mut(stable, tx.method)?
                .transfer_from(tx.this, tx.from, tx.this, amount, tx.method)?;
            state_mut(world, tx)?.stable_debt.insert(tx.from, debt - amount);
            Ok(vec![])
        }
        _ => Err(tx.unknown_method(NAME)),
    }
}
