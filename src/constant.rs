pub mod contract {
    pub const ORACLE: &str = "Oracle";
    pub const STABLE_COIN: &str = "StableCoin";
    pub const LENDING_PLATFORM: &str = "LendingPlatform";
    pub const STABLE: &str = "Stable";
    pub const VOLATILE: &str = "Volatile";
    pub const LSTABLE: &str = "LStable";
    pub const LVOLATILE: &str = "Lvolatile";
}

/// The stablecoin deployment names its oracle getters after ETH, the lending one does not.
pub mod oracle_methods {
    pub mod eth {
        pub const SET_PRICE: &str = "setEthPrice";
        pub const GET_PRICE: &str = "getEthPrice";
    }
    pub mod generic {
        pub const SET_PRICE: &str = "setPrice";
        pub const GET_PRICE: &str = "getPrice";
    }
}

pub mod network {
    pub const LOCAL: &str = "local";
    pub const LOCALHOST: &str = "localhost";
    pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";
    pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
}

pub mod local {
    pub const SIGNER_COUNT: usize = 10;
    pub const SIGNER_BALANCE_ETHER: u64 = 10_000;
    pub const COLLATERAL_RATIO_PERCENT: u64 = 150;
    pub const INITIAL_TOKEN_SUPPLY: u64 = 1_000_000;
}

pub mod stablecoin_defaults {
    pub const INITIAL_PRICE: u64 = 1000;
    pub const DEPOSIT_ETHER: &str = "1";
    pub const MINT: u64 = 200;
    pub const OVER_MINT: u64 = 3000;
    pub const WITHDRAW_ETHER: &str = "1";
    pub const BURN: u64 = 200;
    pub const SECOND_DEPOSIT_ETHER: &str = "1";
    pub const SECOND_MINT: u64 = 500;
    pub const LIQUIDATOR_DEPOSIT_ETHER: &str = "1";
    pub const LIQUIDATOR_MINT: u64 = 500;
    pub const CRASH_PRICE: u64 = 1;
}

pub mod lending_defaults {
    pub const PRICE: u64 = 1000;
    pub const STABLE_DEPOSIT: u64 = 200;
    pub const VOLATILE_TRANSFER: u64 = 2000;
    pub const OVER_BORROW: u64 = 200;
    pub const BORROW: u64 = 20;
}
