pub mod session;
pub mod units;
