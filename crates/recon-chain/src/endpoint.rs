/// HTTP endpoint paths of the ledger node API.
pub mod endpoints {
    pub const GET_ACCOUNT: &str = "/v1/chain/get_account";
    pub const GET_CURRENCY_STATS: &str = "/v1/chain/get_currency_stats";
    pub const PUSH_OPERATIONS: &str = "/v1/chain/push_operations";
}

