use std::path::PathBuf;

use async_trait::async_trait;
use ethers::{
    abi::{Abi, AbiDecode, Function, Token},
    providers::{Http, JsonRpcError, Middleware, Provider, ProviderError, RpcError},
    types::{
        transaction::eip2718::TypedTransaction, Address, TransactionReceipt, TransactionRequest,
        U64,
    },
};

use crate::{
    chain::{Chain, ContractCall},
    contracts::artifact_loader::ArtifactStore,
    error::ChainError,
};

/// JSON-RPC node with unlocked accounts (hardhat node, anvil).
pub struct RpcChain {
    provider: Provider<Http>,
    artifacts: ArtifactStore,
}

impl RpcChain {
    pub fn new(url: &str, artifacts_dir: impl Into<PathBuf>) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(url).map_err(ChainError::transport)?;
        Ok(RpcChain {
            provider,
            artifacts: ArtifactStore::new(artifacts_dir),
        })
    }

    async fn submit(
        &self,
        method: &str,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, ChainError> {
        let pending = self
            .provider
            .send_transaction(tx, None)
            .await
            .map_err(|e| classify(method, e))?;
        let receipt = pending
            .await
            .map_err(|e| classify(method, e))?
            .ok_or_else(|| ChainError::Transport(format!("{} dropped from mempool", method)))?;

        if receipt.status == Some(U64::zero()) {
            return Err(ChainError::reverted(method, "transaction reverted"));
        }
        Ok(receipt)
    }
}

fn lookup<'a>(abi: &'a Abi, contract: &str, method: &str) -> Result<&'a Function, ChainError> {
    abi.function(method).map_err(|_| ChainError::UnknownMethod {
        contract: contract.to_string(),
        method: method.to_string(),
    })
}

/// Hardhat and anvil report reverts as JSON-RPC errors during gas estimation,
/// so the reason has to be recovered from the message text.
pub fn revert_reason(message: &str) -> Option<String> {
    const REASON_MARKER: &str = "reverted with reason string '";
    if let Some(start) = message.find(REASON_MARKER) {
        let rest = &message[start + REASON_MARKER.len()..];
        let reason = rest.split('\'').next().unwrap_or(rest);
        return Some(reason.to_string());
    }
    const CUSTOM_ERROR_MARKER: &str = "reverted with custom error '";
    if let Some(start) = message.find(CUSTOM_ERROR_MARKER) {
        let rest = &message[start + CUSTOM_ERROR_MARKER.len()..];
        let reason = rest.split('\'').next().unwrap_or(rest);
        return Some(reason.to_string());
    }
    const EXECUTION_REVERTED_MARKER: &str = "execution reverted: ";
    if let Some(start) = message.find(EXECUTION_REVERTED_MARKER) {
        let rest = &message[start + EXECUTION_REVERTED_MARKER.len()..];
        let end = rest
            .find(", data:")
            .or_else(|| rest.rfind(')'))
            .unwrap_or(rest.len());
        return Some(rest[..end].trim().to_string());
    }
    if message.contains("execution reverted") || message.contains("VM Exception") {
        return Some(message.to_string());
    }
    None
}

/// Selector of Solidity's `Error(string)`.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

fn decoded_reason(err: &JsonRpcError) -> Option<String> {
    let data = err.as_revert_data()?;
    let payload = data.strip_prefix(&ERROR_STRING_SELECTOR)?;
    String::decode(payload).ok()
}

fn classify(method: &str, err: ProviderError) -> ChainError {
    if let Some(reason) = err.as_error_response().and_then(decoded_reason) {
        return ChainError::reverted(method, reason);
    }
    let message = err.to_string();
    match revert_reason(&message) {
        Some(reason) => ChainError::reverted(method, reason),
        None => ChainError::Transport(message),
    }
}

#[async_trait]
impl Chain for RpcChain {
    async fn signers(&self) -> Result<Vec<Address>, ChainError> {
        self.provider
            .get_accounts()
            .await
            .map_err(ChainError::transport)
    }

    async fn deploy(
        &self,
        from: Address,
        contract: &str,
        constructor_args: &[Token],
    ) -> Result<Address, ChainError> {
        let artifact = self.artifacts.get(contract)?;
        if artifact.bytecode.is_empty() {
            return Err(ChainError::Artifact(format!(
                "{} has no bytecode (abstract contract or interface)",
                contract
            )));
        }

        let data = match artifact.abi.constructor() {
            Some(constructor) => constructor
                .encode_input(artifact.bytecode.to_vec(), constructor_args)
                .map_err(|e| ChainError::abi(contract, e))?,
            None => artifact.bytecode.to_vec(),
        };

        let tx = TransactionRequest::new().from(from).data(data);
        let receipt = self.submit(contract, tx).await?;
        receipt.contract_address.ok_or_else(|| {
            ChainError::Transport(format!("{} deployment receipt has no address", contract))
        })
    }

    async fn send(&self, call: ContractCall) -> Result<(), ChainError> {
        let artifact = self.artifacts.get(&call.contract)?;
        let data = lookup(&artifact.abi, &call.contract, &call.method)?
            .encode_input(&call.args)
            .map_err(|e| ChainError::abi(&call.method, e))?;

        let tx = TransactionRequest::new()
            .from(call.from)
            .to(call.to)
            .value(call.value)
            .data(data);
        self.submit(&call.method, tx).await?;
        Ok(())
    }

    async fn call(&self, call: ContractCall) -> Result<Vec<Token>, ChainError> {
        let artifact = self.artifacts.get(&call.contract)?;
        let function = lookup(&artifact.abi, &call.contract, &call.method)?;
        let data = function
            .encode_input(&call.args)
            .map_err(|e| ChainError::abi(&call.method, e))?;

        let tx: TypedTransaction = TransactionRequest::new()
            .from(call.from)
            .to(call.to)
            .data(data)
            .into();
        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| classify(&call.method, e))?;
        function
            .decode_output(&output)
            .map_err(|e| ChainError::abi(&call.method, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_reason_from_hardhat_message() {
        let message = "(code: -32603, message: Error: VM Exception while processing transaction: \
                       reverted with reason string 'StableCoin: insufficient collateral', \
                       data: None)";
        assert_eq!(
            revert_reason(message).as_deref(),
            Some("StableCoin: insufficient collateral")
        );
    }

    #[test]
    fn test_revert_reason_custom_error() {
        let message =
            "VM Exception while processing transaction: reverted with custom error 'NotOwner()'";
        assert_eq!(revert_reason(message).as_deref(), Some("NotOwner()"));
    }

    #[test]
    fn test_revert_reason_from_anvil_message() {
        let message = "(code: 3, message: execution reverted: StableCoin: insufficient collateral, \
                       data: Some(String(\"0x08c379a0\")))";
        assert_eq!(
            revert_reason(message).as_deref(),
            Some("StableCoin: insufficient collateral")
        );
        let geth = "execution reverted: LendingPlatform: insufficient liquidity)";
        assert_eq!(
            revert_reason(geth).as_deref(),
            Some("LendingPlatform: insufficient liquidity")
        );
    }

    #[test]
    fn test_reason_decoded_from_revert_data() {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(ethers::abi::encode(&[Token::String(
            "StableCoin: insufficient collateral".to_string(),
        )]));
        let err = JsonRpcError {
            code: 3,
            message: "execution reverted".to_string(),
            data: Some(serde_json::Value::String(format!(
                "0x{}",
                ethers::utils::hex::encode(&data)
            ))),
        };
        assert_eq!(
            decoded_reason(&err).as_deref(),
            Some("StableCoin: insufficient collateral")
        );

        let bare = JsonRpcError {
            code: 3,
            message: "execution reverted".to_string(),
            data: None,
        };
        assert_eq!(decoded_reason(&bare), None);
    }

    #[test]
    fn test_transport_errors_are_not_reverts() {
        assert_eq!(revert_reason("error sending request: connection refused"), None);
        let err = ChainError::transport("error sending request: connection refused");
        assert!(!err.is_revert());
    }

    #[test]
    fn test_invalid_url() {
        assert!(RpcChain::new("not a url", "artifacts").is_err());
    }
}
