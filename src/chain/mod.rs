use async_trait::async_trait;
use ethers::{
    abi::Token,
    types::{Address, U256},
};

use crate::error::ChainError;

pub mod local;
pub mod rpc;

pub use local::{LocalChain, LocalParams};
pub use rpc::RpcChain;

/// A method invocation on a deployed contract.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub from: Address,
    pub to: Address,
    pub contract: String,
    pub method: String,
    pub args: Vec<Token>,
    pub value: U256,
}

impl ContractCall {
    pub fn new(from: Address, to: Address, contract: &str, method: &str, args: Vec<Token>) -> Self {
        ContractCall {
            from,
            to,
            contract: contract.to_string(),
            method: method.to_string(),
            args,
            value: U256::zero(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Execution environment the walkthroughs run against.
///
/// Every method resolves only once the node has produced a result, so callers
/// never have two requests in flight.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Signing identities, in the order the node reports them.
    async fn signers(&self) -> Result<Vec<Address>, ChainError>;

    async fn deploy(
        &self,
        from: Address,
        contract: &str,
        constructor_args: &[Token],
    ) -> Result<Address, ChainError>;

    /// State-changing transaction. Waits for inclusion.
    async fn send(&self, call: ContractCall) -> Result<(), ChainError>;

    /// Read-only call.
    async fn call(&self, call: ContractCall) -> Result<Vec<Token>, ChainError>;
}
