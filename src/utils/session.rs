use std::sync::Arc;

use ethers::types::Address;

use crate::{
    chain::{Chain, LocalChain, RpcChain},
    config::AppConfig,
    error::{AppError, ChainError},
};

/// Client handle plus the ordered signing identities it exposes. Only
/// `open_session` builds one, so at least `REQUIRED_SIGNERS` are present.
#[derive(Clone)]
pub struct Session {
    chain: Arc<dyn Chain>,
    signers: Vec<Address>,
}

impl Session {
    pub fn chain(&self) -> Arc<dyn Chain> {
        self.chain.clone()
    }

    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    pub fn primary(&self) -> Address {
        self.signers[0]
    }

    pub fn secondary(&self) -> Address {
        self.signers[1]
    }
}

/// Both walkthroughs need a primary and a secondary identity.
pub const REQUIRED_SIGNERS: usize = 2;

pub fn connect(config: &AppConfig) -> Result<Arc<dyn Chain>, AppError> {
    let chain: Arc<dyn Chain> = match config.endpoint()? {
        None => {
            tracing::info!(network = %config.network, "using in-process network");
            Arc::new(LocalChain::new())
        }
        Some(url) => {
            tracing::info!(network = %config.network, %url, "connecting to node");
            Arc::new(RpcChain::new(&url, &config.artifacts_dir)?)
        }
    };
    Ok(chain)
}

pub async fn open_session(chain: Arc<dyn Chain>) -> Result<Session, ChainError> {
    let signers = chain.signers().await?;
    if signers.len() < REQUIRED_SIGNERS {
        return Err(ChainError::MissingSigner {
            required: REQUIRED_SIGNERS,
            available: signers.len(),
        });
    }
    Ok(Session { chain, signers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::LocalParams;

    #[tokio::test]
    async fn test_open_session_orders_signers() {
        let session = open_session(Arc::new(LocalChain::new())).await.unwrap();
        assert_eq!(session.signers().len(), 10);
        assert_eq!(session.primary(), session.signers()[0]);
        assert_eq!(session.secondary(), session.signers()[1]);
        assert_ne!(session.primary(), session.secondary());
    }

    #[tokio::test]
    async fn test_open_session_needs_two_signers() {
        let chain = LocalChain::with_params(LocalParams {
            signer_count: 1,
            ..LocalParams::default()
        });
        let err = open_session(Arc::new(chain)).await.err().unwrap();
        assert!(matches!(
            err,
            ChainError::MissingSigner {
                required: 2,
                available: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_session_chain_is_shared() {
        let local = Arc::new(LocalChain::new());
        let session = open_session(local.clone()).await.unwrap();
        let chain: Arc<dyn Chain> = local;
        assert!(Arc::ptr_eq(&session.chain(), &chain));
    }

    #[test]
    fn test_connect_local_profile() {
        let config = AppConfig {
            network: "local".to_string(),
            rpc_url: None,
            artifacts_dir: "artifacts".to_string(),
        };
        assert!(connect(&config).is_ok());
    }
}
