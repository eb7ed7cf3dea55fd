pub mod dex_programs {
    pub const JUPITER_V4: &str = "JUP4Fb2cYiPXwb8kNUtUGm6eUJ34UTn3c3d2Ju3ZEVh";
    pub const JUPITER_V6: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
    pub const RAYDIUM_AMM_V4: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
    pub const RAYDIUM_CLMM: &str = "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK";
    pub const RAYDIUM_CPMM: &str = "CPMMoo8L3F4NbTegBCKVNunggL7H1ZpdTHKxQB5qKP1C";
    // Serum DEX v3; older Raydium routes also settle through it.
    pub const SERUM_V3: &str = "9xQeWvGNBgiMqqBts84y5RvHpGfKD6LvAs59AsM9yJ4";
    pub const OPENBOOK: &str = "srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX";
    pub const ORCA_WHIRLPOOL: &str = "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc";
    pub const ORCA_V2: &str = "9W959DqEETiGZocYWCQPaJ6sBmUzgfxXfqGeTEdp3aQP";
    pub const METEORA_DLMM: &str = "LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo";
    pub const METEORA_DAMM: &str = "Eo7WjKq67rjJQSZxS6z3YkapzY3eMj6Xy8X5EQVn5UaB";
    pub const METEORA_DAMM_V2: &str = "cpamdpZCGKUy5JxQXB4dcpGPiikHawvSWAd6mEn1sGG";
    pub const METEORA_DBC: &str = "dbcij3LWUppWqq96dh6gJWwBifmcGfLSB5D4DuSMaqN";
    pub const PUMP_FUN: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
    pub const PUMP_SWAP: &str = "pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA";
}

/// Exchange name to program ids, in registration order.
pub const DEFAULT_EXCHANGES: &[(&str, &[&str])] = &[
    (
        "Raydium",
        &[
            dex_programs::RAYDIUM_AMM_V4,
            dex_programs::RAYDIUM_CLMM,
            dex_programs::RAYDIUM_CPMM,
            dex_programs::SERUM_V3,
        ],
    ),
    ("Serum", &[dex_programs::SERUM_V3, dex_programs::OPENBOOK]),
    ("Jupiter", &[dex_programs::JUPITER_V4, dex_programs::JUPITER_V6]),
    ("Orca", &[dex_programs::ORCA_WHIRLPOOL, dex_programs::ORCA_V2]),
    (
        "Meteora",
        &[
            dex_programs::METEORA_DLMM,
            dex_programs::METEORA_DAMM,
            dex_programs::METEORA_DAMM_V2,
            dex_programs::METEORA_DBC,
        ],
    ),
    ("Pumpfun", &[dex_programs::PUMP_FUN]),
    ("Pumpswap", &[dex_programs::PUMP_SWAP]),
];

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
