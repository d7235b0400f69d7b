use crate::{
    config::StableCoinScenario,
    contracts::{Oracle, PriceMethods, StableCoin},
    error::{AttemptExt, ChainError},
    report::{Event, Report},
    utils::session::Session,
};

/// Oracle + collateralised stablecoin: deposit, mint, rejected over-mint and
/// withdrawal, burn, then a liquidation after the oracle price drops.
pub async fn run(
    session: &Session,
    scenario: &StableCoinScenario,
    report: &mut Report,
) -> Result<(), ChainError> {
    let chain = session.chain();
    let deployer = session.primary();
    let another_user = session.secondary();
    tracing::info!(?deployer, ?another_user, "stablecoin walkthrough started");

    let oracle = Oracle::deploy(chain.clone(), deployer, PriceMethods::ETH).await?;
    oracle.set_price(scenario.initial_price).await?;
    report.push(Event::OraclePrice(oracle.price().await?));

    let stable_coin = StableCoin::deploy(chain, deployer).await?;
    stable_coin.register_oracle(oracle.address()).await?;
    report.push(Event::OracleRegistered(stable_coin.oracle().await?));

    stable_coin.deposit(scenario.deposit_wei).await?;
    report.push(Event::Collateral {
        account: deployer,
        wei: stable_coin.collateral_of(deployer).await?,
    });

    stable_coin.mint(scenario.mint).await?;
    report.push(Event::Balance {
        label: "Minted StableCoin",
        account: deployer,
        amount: stable_coin.balance_of(deployer).await?,
    });

    let outcome = stable_coin.mint(scenario.over_mint).await.attempt()?;
    report.push(Event::OverMint {
        amount: scenario.over_mint,
        outcome,
        balance: stable_coin.balance_of(deployer).await?,
    });

    let outcome = stable_coin.withdraw(scenario.withdraw_wei).await.attempt()?;
    report.push(Event::Withdrawal {
        wei: scenario.withdraw_wei,
        outcome,
    });

    stable_coin.burn(scenario.burn).await?;
    report.push(Event::Balance {
        label: "StableCoin after burn",
        account: deployer,
        amount: stable_coin.balance_of(deployer).await?,
    });

    stable_coin.deposit(scenario.second_deposit_wei).await?;
    stable_coin.mint(scenario.second_mint).await?;
    let liquidator = stable_coin.connect(another_user);
    liquidator.deposit(scenario.liquidator_deposit_wei).await?;
    liquidator.mint(scenario.liquidator_mint).await?;

    oracle.set_price(scenario.crash_price).await?;
    tracing::info!(price = %scenario.crash_price, "oracle price lowered");

    let outcome = liquidator.liquidate(deployer).await.attempt()?;
    report.push(Event::Liquidation {
        user: deployer,
        outcome,
    });

    tracing::info!("stablecoin walkthrough finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chain::{local::CallKind, Chain, ContractCall, LocalChain},
        error::Attempt,
        utils::session::open_session,
    };
    use async_trait::async_trait;
    use ethers::{
        abi::Token,
        types::{Address, U256},
        utils::WEI_IN_ETHER,
    };
    use std::sync::Arc;

    async fn run_on(chain: Arc<LocalChain>, scenario: &StableCoinScenario) -> Report {
        let session = open_session(chain).await.unwrap();
        let mut report = Report::new();
        run(&session, scenario, &mut report).await.unwrap();
        report
    }

    fn balance(report: &Report, label: &str) -> U256 {
        report
            .events()
            .iter()
            .find_map(|event| match event {
                Event::Balance {
                    label: l, amount, ..
                } if *l == label => Some(*amount),
                _ => None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_default_walkthrough() {
        let report = run_on(Arc::new(LocalChain::new()), &StableCoinScenario::default()).await;

        assert_eq!(report.events()[0], Event::OraclePrice(1000.into()));
        assert!(matches!(
            report.events()[2],
            Event::Collateral { wei, .. } if wei == WEI_IN_ETHER
        ));
        assert_eq!(balance(&report, "Minted StableCoin"), U256::from(200));
        assert_eq!(balance(&report, "StableCoin after burn"), U256::zero());

        let lines = report.lines();
        assert_eq!(lines[0], "price from Oracle: 1000");
        assert_eq!(lines[2], "Deposit (ETH): 1.0");
        assert_eq!(lines[3], "Minted StableCoin: 200");
        assert_eq!(
            lines[4],
            "mint of 3000 rejected: StableCoin: insufficient collateral (balance: 200)"
        );
        assert!(lines[5].contains("rejected"));
        assert_eq!(lines[6], "StableCoin after burn: 0");
        assert_eq!(lines.last().unwrap(), "Liquidation successful");
    }

    #[tokio::test]
    async fn test_oracle_is_wired_before_minting() {
        let chain = Arc::new(LocalChain::new());
        let report = run_on(chain.clone(), &StableCoinScenario::default()).await;
        let journal = chain.journal().await;

        let first_mint = journal
            .iter()
            .position(|r| r.method == "mint" || r.method == "withdraw")
            .unwrap();
        let price_updates: Vec<_> = journal[..first_mint]
            .iter()
            .filter(|r| r.kind == CallKind::Send && r.method == "setEthPrice")
            .collect();
        assert_eq!(price_updates.len(), 1);
        assert_eq!(price_updates[0].args, vec![Token::Uint(1000.into())]);

        let oracle_address = journal
            .iter()
            .find(|r| r.method == "registerOracle")
            .map(|r| r.args.clone())
            .unwrap();
        assert_eq!(
            oracle_address,
            vec![Token::Address(match report.events()[1] {
                Event::OracleRegistered(address) => address,
                _ => panic!("expected oracle registration"),
            })]
        );
    }

    #[tokio::test]
    async fn test_rejected_calls_do_not_stop_the_run() {
        let chain = Arc::new(LocalChain::new());
        let report = run_on(chain.clone(), &StableCoinScenario::default()).await;

        let over_mint = report
            .events()
            .iter()
            .find(|e| matches!(e, Event::OverMint { .. }))
            .unwrap();
        assert_eq!(
            over_mint,
            &Event::OverMint {
                amount: 3000.into(),
                outcome: Attempt::Rejected("StableCoin: insufficient collateral".to_string()),
                balance: 200.into(),
            }
        );

        let reverted: Vec<_> = chain
            .journal()
            .await
            .into_iter()
            .filter(|r| r.reverted.is_some())
            .map(|r| r.method)
            .collect();
        assert_eq!(reverted, vec!["mint", "withdraw"]);
    }

    #[tokio::test]
    async fn test_overflowing_mint_is_rejected() {
        let scenario = StableCoinScenario {
            over_mint: U256::MAX,
            ..StableCoinScenario::default()
        };
        let report = run_on(Arc::new(LocalChain::new()), &scenario).await;

        assert!(report.events().contains(&Event::OverMint {
            amount: U256::MAX,
            outcome: Attempt::Rejected("StableCoin: arithmetic overflow".to_string()),
            balance: 200.into(),
        }));
        assert_eq!(report.lines().last().unwrap(), "Liquidation successful");
    }

    #[tokio::test]
    async fn test_burn_reports_remaining_balance() {
        let scenario = StableCoinScenario {
            burn: 150.into(),
            ..StableCoinScenario::default()
        };
        let report = run_on(Arc::new(LocalChain::new()), &scenario).await;
        assert_eq!(balance(&report, "StableCoin after burn"), U256::from(50));
    }

    #[tokio::test]
    async fn test_healthy_position_cannot_be_liquidated() {
        let scenario = StableCoinScenario {
            crash_price: 1000.into(),
            ..StableCoinScenario::default()
        };
        let report = run_on(Arc::new(LocalChain::new()), &scenario).await;
        assert_eq!(
            report.lines().last().unwrap(),
            "failed to liquidate: StableCoin: position is healthy"
        );
    }

    #[tokio::test]
    async fn test_withdrawal_within_ratio_is_accepted() {
        let scenario = StableCoinScenario {
            withdraw_wei: WEI_IN_ETHER / 10,
            ..StableCoinScenario::default()
        };
        let report = run_on(Arc::new(LocalChain::new()), &scenario).await;
        assert!(report.events().iter().any(|e| matches!(
            e,
            Event::Withdrawal {
                outcome: Attempt::Accepted(()),
                ..
            }
        )));
    }

    /// Delegates to a local network but fails one method at the transport level.
    struct FlakyChain {
        inner: LocalChain,
        broken_method: &'static str,
    }

    #[async_trait]
    impl Chain for FlakyChain {
        async fn signers(&self) -> Result<Vec<Address>, ChainError> {
            self.inner.signers().await
        }

        async fn deploy(
            &self,
            from: Address,
            contract: &str,
            constructor_args: &[Token],
        ) -> Result<Address, ChainError> {
            self.inner.deploy(from, contract, constructor_args).await
        }

        async fn send(&self, call: ContractCall) -> Result<(), ChainError> {
            if call.method == self.broken_method {
                return Err(ChainError::transport("connection reset by peer"));
            }
            self.inner.send(call).await
        }

        async fn call(&self, call: ContractCall) -> Result<Vec<Token>, ChainError> {
            self.inner.call(call).await
        }
    }

    #[tokio::test]
    async fn test_transport_failure_in_guarded_step_propagates() {
        let chain = Arc::new(FlakyChain {
            inner: LocalChain::new(),
            broken_method: "withdraw",
        });
        let session = open_session(chain).await.unwrap();
        let mut report = Report::new();

        let err = run(&session, &StableCoinScenario::default(), &mut report)
            .await
            .unwrap_err();

        assert!(matches!(err, ChainError::Transport(_)));
        // everything up to the over-mint was still reported
        assert_eq!(report.events().len(), 5);
    }
}
