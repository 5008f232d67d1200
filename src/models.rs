use ethers::types::U256;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::enums::{ SwapStep, TxStatus };

/// Quotes older than this must be re-fetched before they can be executed.
pub const QUOTE_TTL_MS: i64 = 30_000;

/// Pending swap records older than this are discarded on load.
pub const PENDING_SWAP_EXPIRY_MS: i64 = 60 * 60 * 1000;

/// Address used by the backend for a chain's native asset.
pub const NATIVE_TOKEN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub address: String,
    pub decimals: u8,
    pub chain_id: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Token {
    pub fn is_native(&self) -> bool {
        self.address.eq_ignore_ascii_case(NATIVE_TOKEN_ADDRESS)
    }

    /// Same token on the same chain, ignoring catalog metadata such as price.
    pub fn same_asset(&self, other: &Token) -> bool {
        self.chain_id == other.chain_id &&
            self.symbol == other.symbol &&
            self.address.eq_ignore_ascii_case(&other.address)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_hub: bool,
}

/// A priced swap offer. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub from_token: Token,
    pub to_token: Token,
    pub from_amount: String,
    pub to_amount: String,
    pub rate: f64,
    pub price_impact: f64,
    pub estimated_gas: String,
    pub minimum_received: String,
    pub slippage: f64,
    /// Raw output amount at `to_token.decimals`.
    pub quoted_amount: U256,
    pub created_at_ms: i64,
}

impl Quote {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.created_at_ms
    }

    pub fn is_stale(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) > QUOTE_TTL_MS
    }

    /// Countdown text for the quote's remaining lifetime.
    pub fn expires_in(&self, now_ms: i64) -> String {
        let remaining = QUOTE_TTL_MS - self.age_ms(now_ms);
        if remaining <= 0 {
            return "Expired".to_string();
        }
        format!("{}s", remaining / 1000)
    }
}

/// The one swap whose source transaction is known but not yet settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSwapRecord {
    pub tx_hash: String,
    pub from_token: Token,
    pub to_token: Token,
    pub from_amount: String,
    pub to_amount: String,
    pub created_at_ms: i64,
    pub step: SwapStep,
}

impl PendingSwapRecord {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.created_at_ms > PENDING_SWAP_EXPIRY_MS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub from_token: Token,
    pub to_token: Token,
    pub from_amount: String,
    pub to_amount: String,
    pub status: TxStatus,
    pub created_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub from_token: Token,
    pub to_token: Token,
    pub from_amount: String,
    pub to_amount: String,
}

impl From<&Quote> for NewTransaction {
    fn from(quote: &Quote) -> Self {
        Self {
            from_token: quote.from_token.clone(),
            to_token: quote.to_token.clone(),
            from_amount: quote.from_amount.clone(),
            to_amount: quote.to_amount.clone(),
        }
    }
}
