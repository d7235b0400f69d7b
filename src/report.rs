use std::fmt;

use ethers::types::{Address, U256};

use crate::{error::Attempt, utils::units::display_ether};

/// One observable outcome of a walkthrough step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    OraclePrice(U256),
    OracleRegistered(Address),
    Collateral {
        account: Address,
        wei: U256,
    },
    Balance {
        label: &'static str,
        account: Address,
        amount: U256,
    },
    /// Mint above the allowed ratio; `balance` is read back afterwards.
    OverMint {
        amount: U256,
        outcome: Attempt<()>,
        balance: U256,
    },
    Withdrawal {
        wei: U256,
        outcome: Attempt<()>,
    },
    Liquidation {
        user: Address,
        outcome: Attempt<()>,
    },
    /// `Accepted` carries the borrower's stable balance after the loan.
    Borrow {
        amount: U256,
        outcome: Attempt<U256>,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::OraclePrice(price) => write!(f, "price from Oracle: {}", price),
            Event::OracleRegistered(oracle) => write!(f, "registered oracle: {:?}", oracle),
            Event::Collateral { wei, .. } => write!(f, "Deposit (ETH): {}", display_ether(*wei)),
            Event::Balance { label, amount, .. } => write!(f, "{}: {}", label, amount),
            Event::OverMint {
                amount,
                outcome,
                balance,
            } => match outcome {
                Attempt::Accepted(()) => {
                    write!(f, "mint of {} accepted, balance: {}", amount, balance)
                }
                Attempt::Rejected(reason) => {
                    write!(f, "mint of {} rejected: {} (balance: {})", amount, reason, balance)
                }
            },
            Event::Withdrawal { wei, outcome } => match outcome {
                Attempt::Accepted(()) => {
                    write!(f, "withdrawal of {} ETH accepted", display_ether(*wei))
                }
                Attempt::Rejected(reason) => write!(
                    f,
                    "withdrawal of {} ETH rejected: {}",
                    display_ether(*wei),
                    reason
                ),
            },
            Event::Liquidation { outcome, .. } => match outcome {
                Attempt::Accepted(()) => write!(f, "Liquidation successful"),
                Attempt::Rejected(reason) => write!(f, "failed to liquidate: {}", reason),
            },
            Event::Borrow { outcome, .. } => match outcome {
                Attempt::Accepted(balance) => {
                    write!(f, "borrow success, stable balance: {}", balance)
                }
                Attempt::Rejected(_) => write!(f, "borrow failed"),
            },
        }
    }
}

/// Ordered record of a walkthrough run. Procedures only push; the binary
/// decides how to present it.
#[derive(Debug, Default)]
pub struct Report {
    events: Vec<Event>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        match &event {
            Event::OverMint {
                outcome: Attempt::Rejected(reason),
                ..
            }
            | Event::Withdrawal {
                outcome: Attempt::Rejected(reason),
                ..
            }
            | Event::Liquidation {
                outcome: Attempt::Rejected(reason),
                ..
            }
            | Event::Borrow {
                outcome: Attempt::Rejected(reason),
                ..
            } => tracing::warn!(%reason, "contract rejected call"),
            _ => {}
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn print(&self) {
        for line in self.lines() {
            println!("{}", line);
        }
    }
}
