use dotenv::dotenv;
use std::{env, process};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use defi_walkthrough::{
    config::{AppConfig, LendingScenario, StableCoinScenario},
    error::AppError,
    handler::{lending_walkthrough, stablecoin_walkthrough},
    report::Report,
    utils::session::{connect, open_session},
};

#[derive(Debug, Clone, Copy)]
enum Walkthrough {
    StableCoin,
    Lending,
}

impl Walkthrough {
    fn name(self) -> &'static str {
        match self {
            Walkthrough::StableCoin => "stablecoin",
            Walkthrough::Lending => "lending",
        }
    }
}

fn parse_selection(arg: Option<&str>) -> Option<Vec<Walkthrough>> {
    match arg.unwrap_or("all") {
        "stablecoin" => Some(vec![Walkthrough::StableCoin]),
        "lending" => Some(vec![Walkthrough::Lending]),
        "all" => Some(vec![Walkthrough::StableCoin, Walkthrough::Lending]),
        _ => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the report only
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

async fn run(selected: &[Walkthrough]) -> Result<(), AppError> {
    let config = AppConfig::new();
    let chain = connect(&config)?;

    for walkthrough in selected {
        let session = open_session(chain.clone()).await?;
        let mut report = Report::new();
        println!("== {} ==", walkthrough.name());

        let result = match walkthrough {
            Walkthrough::StableCoin => {
                let scenario = StableCoinScenario::from_env()?;
                stablecoin_walkthrough::run(&session, &scenario, &mut report).await
            }
            Walkthrough::Lending => {
                let scenario = LendingScenario::from_env()?;
                lending_walkthrough::run(&session, &scenario, &mut report).await
            }
        };

        report.print();
        result?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let arg = env::args().nth(1);
    let selected = match parse_selection(arg.as_deref()) {
        Some(selected) => selected,
        None => {
            eprintln!("usage: walkthrough [stablecoin|lending|all]");
            process::exit(2);
        }
    };

    if let Err(e) = run(&selected).await {
        tracing::error!(error = %e, "walkthrough failed");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection(None).map(|s| s.len()), Some(2));
        assert_eq!(parse_selection(Some("all")).map(|s| s.len()), Some(2));
        assert!(matches!(
            parse_selection(Some("lending")).as_deref(),
            Some([Walkthrough::Lending])
        ));
        assert!(parse_selection(Some("vault")).is_none());
    }
}
