use std::collections::HashMap;

use async_trait::async_trait;
use ethers::{
    abi::Token,
    types::{Address, U256},
    utils::{get_contract_address, WEI_IN_ETHER},
};
use tokio::sync::Mutex;

use crate::{
    chain::{Chain, ContractCall},
    constant::{contract, local},
    error::ChainError,
};

mod lending_platform;
mod oracle;
mod stable_coin;
mod token;

use lending_platform::LendingState;
use oracle::OracleState;
use stable_coin::StableCoinState;
use token::TokenState;

#[derive(Debug, Clone)]
pub struct LocalParams {
    pub signer_count: usize,
    pub signer_balance: U256,
    pub collateral_ratio_percent: U256,
    pub initial_token_supply: U256,
}

impl Default for LocalParams {
    fn default() -> Self {
        LocalParams {
            signer_count: local::SIGNER_COUNT,
            signer_balance: WEI_IN_ETHER * U256::from(local::SIGNER_BALANCE_ETHER),
            collateral_ratio_percent: local::COLLATERAL_RATIO_PERCENT.into(),
            initial_token_supply: local::INITIAL_TOKEN_SUPPLY.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Deploy,
    Send,
    Call,
}

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub kind: CallKind,
    pub from: Address,
    pub contract: String,
    pub method: String,
    pub args: Vec<Token>,
    pub value: U256,
    pub reverted: Option<String>,
}

#[derive(Debug, Clone)]
enum Deployed {
    Oracle(OracleState),
    StableCoin(StableCoinState),
    Token(TokenState),
    LendingPlatform(LendingState),
}

/// Everything a transaction may touch. Cloned before each transaction and
/// swapped back in only on success.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorldState {
    native: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, Deployed>,
}

/// Overflow reverts the transaction, as in Solidity 0.8 checked arithmetic.
pub(crate) fn checked_add(
    a: U256,
    b: U256,
    method: &str,
    contract: &str,
) -> Result<U256, ChainError> {
    a.checked_add(b).ok_or_else(|| {
        ChainError::reverted(method, format!("{}: arithmetic overflow", contract))
    })
}

/// Execution context of one simulated contract call.
pub(crate) struct Tx<'a> {
    pub from: Address,
    pub this: Address,
    pub value: U256,
    pub method: &'a str,
    pub args: &'a [Token],
}

impl Tx<'_> {
    pub fn revert(&self, reason: &str) -> ChainError {
        ChainError::reverted(self.method, reason)
    }

    pub fn uint(&self, index: usize) -> Result<U256, ChainError> {
        self.args
            .get(index)
            .cloned()
            .and_then(Token::into_uint)
            .ok_or_else(|| self.bad_arg(index, "uint256"))
    }

    pub fn address(&self, index: usize) -> Result<Address, ChainError> {
        self.args
            .get(index)
            .cloned()
            .and_then(Token::into_address)
            .ok_or_else(|| self.bad_arg(index, "address"))
    }

    pub fn unknown_method(&self, contract: &str) -> ChainError {
        ChainError::UnknownMethod {
            contract: contract.to_string(),
            method: self.method.to_string(),
        }
    }

    fn bad_arg(&self, index: usize, expected: &str) -> ChainError {
        ChainError::abi(
            self.method,
            format!("argument {} is not a valid {}", index, expected),
        )
    }
}

impl WorldState {
    pub fn native_balance(&self, account: Address) -> U256 {
        self.native.get(&account).copied().unwrap_or_default()
    }

    pub fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
        method: &str,
    ) -> Result<(), ChainError> {
        let balance = self.native_balance(from);
        if balance < amount {
            return Err(ChainError::reverted(method, "insufficient funds for transfer"));
        }
        self.native.insert(from, balance - amount);
        let credited = checked_add(self.native_balance(to), amount, method, "native")?;
        self.native.insert(to, credited);
        Ok(())
    }

    pub fn oracle_price(&self, oracle: Address, method: &str) -> Result<U256, ChainError> {
        match self.contracts.get(&oracle) {
            Some(Deployed::Oracle(state)) => Ok(state.price),
            _ => Err(ChainError::reverted(method, "oracle not registered")),
        }
    }

    pub fn token_mut(
        &mut self,
        address: Address,
        method: &str,
    ) -> Result<&mut TokenState, ChainError> {
        match self.contracts.get_mut(&address) {
            Some(Deployed::Token(state)) => Ok(state),
            _ => Err(ChainError::reverted(method, "call to non-token address")),
        }
    }

    pub fn token(&self, address: Address, method: &str) -> Result<&TokenState, ChainError> {
        match self.contracts.get(&address) {
            Some(Deployed::Token(state)) => Ok(state),
            _ => Err(ChainError::reverted(method, "call to non-token address")),
        }
    }

    fn next_nonce(&mut self, account: Address) -> u64 {
        let nonce = self.nonces.entry(account).or_default();
        let current = *nonce;
        *nonce += 1;
        current
    }

    fn construct(
        &self,
        name: &str,
        from: Address,
        args: &[Token],
        params: &LocalParams,
    ) -> Result<Deployed, ChainError> {
        let deployed = match name {
            contract::ORACLE => Deployed::Oracle(OracleState::new(from)),
            contract::STABLE_COIN => {
                Deployed::StableCoin(StableCoinState::new(from, params.collateral_ratio_percent))
            }
            contract::STABLE | contract::VOLATILE => {
                Deployed::Token(TokenState::new(name, from, params.initial_token_supply))
            }
            contract::LSTABLE | contract::LVOLATILE => {
                Deployed::Token(TokenState::new(name, from, U256::zero()))
            }
            contract::LENDING_PLATFORM => {
                let tx = Tx {
                    from,
                    this: Address::zero(),
                    value: U256::zero(),
                    method: "constructor",
                    args,
                };
                Deployed::LendingPlatform(LendingState::new(
                    from,
                    tx.address(0)?,
                    tx.address(1)?,
                    tx.address(2)?,
                    tx.address(3)?,
                    params.collateral_ratio_percent,
                ))
            }
            other => return Err(ChainError::UnknownContract(other.to_string())),
        };
        Ok(deployed)
    }

    fn execute(&mut self, tx: &Tx) -> Result<Vec<Token>, ChainError> {
        let payable = matches!(self.contracts.get(&tx.this), Some(Deployed::StableCoin(_)))
            && stable_coin::is_payable(tx.method);
        if !tx.value.is_zero() && !payable {
            return Err(tx.revert("non-payable method received value"));
        }
        match self.contracts.get(&tx.this) {
            Some(Deployed::Oracle(_)) => oracle::invoke(self, tx),
            Some(Deployed::StableCoin(_)) => stable_coin::invoke(self, tx),
            Some(Deployed::Token(_)) => token::invoke(self, tx),
            Some(Deployed::LendingPlatform(_)) => lending_platform::invoke(self, tx),
            None => Err(ChainError::UnknownContract(format!("{:?}", tx.this))),
        }
    }
}

struct Inner {
    world: WorldState,
    journal: Vec<CallRecord>,
}

/// In-process network hosting simulated copies of the walkthrough contracts.
pub struct LocalChain {
    signers: Vec<Address>,
    params: LocalParams,
    inner: Mutex<Inner>,
}

impl LocalChain {
    pub fn new() -> Self {
        Self::with_params(LocalParams::default())
    }

    pub fn with_params(params: LocalParams) -> Self {
        let signers: Vec<Address> = (1..=params.signer_count as u64)
            .map(Address::from_low_u64_be)
            .collect();
        let mut world = WorldState::default();
        for signer in &signers {
            world.native.insert(*signer, params.signer_balance);
        }
        LocalChain {
            signers,
            params,
            inner: Mutex::new(Inner {
                world,
                journal: Vec::new(),
            }),
        }
    }

    /// Every deploy, transaction and read issued so far, in order.
    pub async fn journal(&self) -> Vec<CallRecord> {
        self.inner.lock().await.journal.clone()
    }

    pub async fn native_balance(&self, account: Address) -> U256 {
        self.inner.lock().await.world.native_balance(account)
    }
}

impl Default for LocalChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Chain for LocalChain {
    async fn signers(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.signers.clone())
    }

    async fn deploy(
        &self,
        from: Address,
        contract: &str,
        constructor_args: &[Token],
    ) -> Result<Address, ChainError> {
        let mut inner = self.inner.lock().await;
        let result = inner
            .world
            .construct(contract, from, constructor_args, &self.params)
            .map(|deployed| {
                let nonce = inner.world.next_nonce(from);
                let address = get_contract_address(from, nonce);
                inner.world.contracts.insert(address, deployed);
                address
            });
        inner.journal.push(CallRecord {
            kind: CallKind::Deploy,
            from,
            contract: contract.to_string(),
            method: "constructor".to_string(),
            args: constructor_args.to_vec(),
            value: U256::zero(),
            reverted: revert_reason(&result),
        });
        result
    }

    async fn send(&self, call: ContractCall) -> Result<(), ChainError> {
        let mut inner = self.inner.lock().await;
        let mut world = inner.world.clone();
        world.next_nonce(call.from);
        let tx = Tx {
            from: call.from,
            this: call.to,
            value: call.value,
            method: &call.method,
            args: &call.args,
        };
        let result = world
            .transfer_native(call.from, call.to, call.value, &call.method)
            .and_then(|_| world.execute(&tx))
            .map(|_| ());
        if result.is_ok() {
            inner.world = world;
        }
        inner.journal.push(record(CallKind::Send, &call, revert_reason(&result)));
        result
    }

    async fn call(&self, call: ContractCall) -> Result<Vec<Token>, ChainError> {
        let mut inner = self.inner.lock().await;
        let mut scratch = inner.world.clone();
        let tx = Tx {
            from: call.from,
            this: call.to,
            value: U256::zero(),
            method: &call.method,
            args: &call.args,
        };
        let result = scratch.execute(&tx);
        inner.journal.push(record(CallKind::Call, &call, revert_reason(&result)));
        result
    }
}

fn record(kind: CallKind, call: &ContractCall, reverted: Option<String>) -> CallRecord {
    CallRecord {
        kind,
        from: call.from,
        contract: call.contract.clone(),
        method: call.method.clone(),
        args: call.args.clone(),
        value: call.value,
        reverted,
    }
}

fn revert_reason<T>(result: &Result<T, ChainError>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(ChainError::Reverted { reason, .. }) => Some(reason.clone()),
        Err(e) => Some(e.to_string()),
    }
}
