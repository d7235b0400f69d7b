use ethers::types::{Address, U256};

use crate::{
    config::LendingScenario,
    contracts::{LendingPlatform, Oracle, PriceMethods, TokenSet},
    error::{Attempt, AttemptExt, ChainError},
    handler::deploy_tokens::deploy_tokens,
    report::{Event, Report},
    utils::session::Session,
};

/// Lending platform over a stable/volatile token pair: both identities
/// deposit, then the primary one tries two stable borrows.
pub async fn run(
    session: &Session,
    scenario: &LendingScenario,
    report: &mut Report,
) -> Result<(), ChainError> {
    let chain = session.chain();
    let deployer = session.primary();
    let second_user = session.secondary();
    tracing::info!(?deployer, ?second_user, "lending walkthrough started");

    let oracle = Oracle::deploy(chain.clone(), deployer, PriceMethods::GENERIC).await?;
    oracle.set_price(scenario.price).await?;
    report.push(Event::OraclePrice(oracle.price().await?));

    let tokens = deploy_tokens(chain.clone(), deployer).await?;
    let lending_platform = LendingPlatform::deploy(chain, deployer, &tokens).await?;
    lending_platform.register_oracle(oracle.address()).await?;

    tokens
        .stable
        .approve(lending_platform.address(), scenario.stable_deposit)
        .await?;
    lending_platform.deposit_stable(scenario.stable_deposit).await?;
    report.push(Event::Balance {
        label: "lstable balance",
        account: deployer,
        amount: tokens.lstable.balance_of(deployer).await?,
    });

    tokens
        .volatile
        .transfer(second_user, scenario.volatile_transfer)
        .await?;
    tokens
        .volatile
        .connect(second_user)
        .approve(lending_platform.address(), scenario.volatile_transfer)
        .await?;
    lending_platform
        .connect(second_user)
        .deposit_volatile(scenario.volatile_transfer)
        .await?;
    report.push(Event::Balance {
        label: "lvolatile balance",
        account: second_user,
        amount: tokens.lvolatile.balance_of(second_user).await?,
    });

    for amount in [scenario.over_borrow, scenario.borrow] {
        let outcome = borrow(&lending_platform, &tokens, deployer, amount).await?;
        report.push(Event::Borrow { amount, outcome });
    }

    tracing::info!("lending walkthrough finished");
    Ok(())
}

async fn borrow(
    platform: &LendingPlatform,
    tokens: &TokenSet,
    borrower: Address,
    amount: U256,
) -> Result<Attempt<U256>, ChainError> {
    match platform.borrow_stable(amount).await.attempt()? {
        Attempt::Accepted(()) => {
            let balance = tokens.stable.balance_of(borrower).await?;
            Ok(Attempt::Accepted(balance))
        }
        Attempt::Rejected(reason) => Ok(Attempt::Rejected(reason)),
    }
}
