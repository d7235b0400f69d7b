use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("{method} reverted: {reason}")]
    Reverted { method: String, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("no contract named {0}")]
    UnknownContract(String),

    #[error("contract {contract} has no method {method}")]
    UnknownMethod { contract: String, method: String },

    #[error("abi error in {context}: {message}")]
    Abi { context: String, message: String },

    #[error("unexpected return value from {0}")]
    Decode(String),

    #[error("network exposes {available} signers, {required} required")]
    MissingSigner { required: usize, available: usize },
}

impl ChainError {
    pub fn reverted(method: &str, reason: impl Into<String>) -> Self {
        ChainError::Reverted {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        ChainError::Transport(err.to_string())
    }

    pub fn abi(context: &str, err: impl std::fmt::Display) -> Self {
        ChainError::Abi {
            context: context.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, ChainError::Reverted { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {message}")]
    Invalid {
        key: String,
        value: String,
        message: String,
    },

    #[error("unknown network profile {0:?} and no RPC_URL set")]
    UnknownProfile(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Outcome of a call the contract is allowed to refuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Accepted(T),
    Rejected(String),
}

impl<T> Attempt<T> {
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Attempt::Accepted(_) => None,
            Attempt::Rejected(reason) => Some(reason),
        }
    }
}

pub trait AttemptExt<T> {
    /// Turns a contract revert into `Attempt::Rejected`; any other failure
    /// still propagates.
    fn attempt(self) -> Result<Attempt<T>, ChainError>;
}

impl<T> AttemptExt<T> for Result<T, ChainError> {
    fn attempt(self) -> Result<Attempt<T>, ChainError> {
        match self {
            Ok(value) => Ok(Attempt::Accepted(value)),
            Err(ChainError::Reverted { reason, .. }) => Ok(Attempt::Rejected(reason)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_becomes_rejection() {
        let result: Result<(), ChainError> =
            Err(ChainError::reverted("mint", "StableCoin: insufficient collateral"));
        let attempt = result.attempt().unwrap();
        assert_eq!(
            attempt.rejection(),
            Some("StableCoin: insufficient collateral")
        );
    }

    #[test]
    fn test_transport_error_still_propagates() {
        let result: Result<(), ChainError> = Err(ChainError::transport("connection refused"));
        assert!(result.attempt().is_err());
    }
}
