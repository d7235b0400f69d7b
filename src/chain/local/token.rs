use std::collections::HashMap;

use ethers::{
    abi::Token,
    types::{Address, U256},
};

use super::{checked_add, Deployed, Tx, WorldState};
use crate::error::ChainError;

/// Plain ERC-20 ledger. The lending platform mints and burns receipt tokens
/// through `mint`/`burn` directly.
#[derive(Debug, Clone)]
pub(crate) struct TokenState {
    pub name: String,
    pub balances: HashMap<Address, U256>,
    pub allowances: HashMap<(Address, Address), U256>,
    pub total_supply: U256,
}

impl TokenState {
    pub fn new(name: &str, holder: Address, initial_supply: U256) -> Self {
        let mut balances = HashMap::new();
        if !initial_supply.is_zero() {
            balances.insert(holder, initial_supply);
        }
        TokenState {
            name: name.to_string(),
            balances,
            allowances: HashMap::new(),
            total_supply: initial_supply,
        }
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
        method: &str,
    ) -> Result<(), ChainError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(ChainError::reverted(
                method,
                "ERC20: transfer amount exceeds balance",
            ));
        }
        self.balances.insert(from, balance - amount);
        let credited = checked_add(self.balance_of(to), amount, method, &self.name)?;
        self.balances.insert(to, credited);
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
        method: &str,
    ) -> Result<(), ChainError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(ChainError::reverted(method, "ERC20: insufficient allowance"));
        }
        self.transfer(from, to, amount, method)?;
        self.allowances.insert((from, spender), allowed - amount);
        Ok(())
    }

    pub fn mint(&mut self, to: Address, amount: U256, method: &str) -> Result<(), ChainError> {
        let balance = checked_add(self.balance_of(to), amount, method, &self.name)?;
        self.total_supply = checked_add(self.total_supply, amount, method, &self.name)?;
        self.balances.insert(to, balance);
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256, method: &str) -> Result<(), ChainError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(ChainError::reverted(method, "ERC20: burn amount exceeds balance"));
        }
        self.balances.insert(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }
}

pub(crate) fn invoke(world: &mut WorldState, tx: &Tx) -> Result<Vec<Token>, ChainError> {
    let state = match world.contracts.get_mut(&tx.this) {
        Some(Deployed::Token(state)) => state,
        _ => return Err(ChainError::UnknownContract(format!("{:?}", tx.this))),
    };

    match tx.method {
        "name" | "symbol" => Ok(vec![Token::String(state.name.clone())]),
        "decimals" => Ok(vec![Token::Uint(U256::zero())]),
        "totalSupply" => Ok(vec![Token::Uint(state.total_supply)]),
        "balanceOf" => Ok(vec![Token::Uint(state.balance_of(tx.address(0)?))]),
        "allowance" => Ok(vec![Token::Uint(
            state.allowance(tx.address(0)?, tx.address(1)?),
        )]),
        "approve" => {
            state
                .allowances
                .insert((tx.from, tx.address(0)?), tx.uint(1)?);
            Ok(vec![Token::Bool(true)])
        }
        "transfer" => {
            state.transfer(tx.from, tx.address(0)?, tx.uint(1)?, tx.method)?;
            Ok(vec![Token::Bool(true)])
        }
        "transferFrom" => {
            state.transfer_from(
                tx.from,
                tx.address(0)?,
                tx.address(1)?,
                tx.uint(2)?,
                tx.method,
            )?;
            Ok(vec![Token::Bool(true)])
        }
        _ => Err(tx.unknown_method(&state.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let owner = Address::from_low_u64_be(1);
        let spender = Address::from_low_u64_be(2);
        let mut token = TokenState::new("Stable", owner, 1000.into());

        let err = token
            .transfer_from(spender, owner, spender, 10.into(), "transferFrom")
            .unwrap_err();
        assert!(err.to_string().contains("insufficient allowance"));

        token.allowances.insert((owner, spender), 50.into());
        token
            .transfer_from(spender, owner, spender, 30.into(), "transferFrom")
            .unwrap();
        assert_eq!(token.balance_of(owner), U256::from(970));
        assert_eq!(token.balance_of(spender), U256::from(30));
        assert_eq!(token.allowance(owner, spender), U256::from(20));
    }

    #[test]
    fn test_burn_reduces_supply() {
        let holder = Address::from_low_u64_be(1);
        let mut token = TokenState::new("LStable", holder, U256::zero());
        token.mint(holder, 200.into(), "mint").unwrap();
        token.burn(holder, 150.into(), "burn").unwrap();
        assert_eq!(token.total_supply, U256::from(50));
        assert!(token.burn(holder, 51.into(), "burn").is_err());
    }

    #[test]
    fn test_overflow_reverts_without_panicking() {
        let holder = Address::from_low_u64_be(1);
        let other = Address::from_low_u64_be(2);
        let mut token = TokenState::new("LStable", holder, U256::MAX);

        let err = token.mint(other, 1.into(), "depositStable").unwrap_err();
        assert!(err.is_revert());
        assert!(err.to_string().contains("LStable: arithmetic overflow"));
        assert_eq!(token.total_supply, U256::MAX);
        assert_eq!(token.balance_of(other), U256::zero());

        token.balances.insert(other, U256::MAX);
        let err = token.transfer(holder, other, 1.into(), "transfer").unwrap_err();
        assert!(err.is_revert());
    }
}
