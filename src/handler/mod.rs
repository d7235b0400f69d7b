pub mod deploy_tokens;
pub mod lending_walkthrough;
pub mod stablecoin_walkthrough;
