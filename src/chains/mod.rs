//! Chain identifier resolution.
//!
//! Three naming schemes meet here: the platform chain id used by the token
//! catalog (`"sonic"`, `"0xa4b1.arbitrum"`), the numeric EVM network id the
//! wallet speaks (146, 42161), and the blockchain id the swap backend expects.

pub mod explorer;

pub use explorer::{ explorer_name, explorer_tx_url };

use crate::error::{ AppError, Result };

/// Platform chain ids recognised by the application.
pub const SUPPORTED_CHAINS: &[&str] = &[
    "sonic",
    "ethereum",
    "arbitrum",
    "base",
    "bsc",
    "optimism",
    "polygon",
    "avalanche",
    "sui",
    "solana",
    "stellar",
    "injective",
    "icon",
    "hyper",
    "lightlink",
];

/// Numeric network id for a platform chain id.
///
/// Falls back to reading the hex prefix of structured ids such as
/// `"0x2019.kaia"` when the chain is not in the table.
pub fn to_network_id(platform_chain_id: &str) -> Option<u64> {
    let mapped = match platform_chain_id {
        "sonic" => Some(146),
        "0xa4b1.arbitrum" | "arbitrum" => Some(42161),
        "0x2105.base" | "base" => Some(8453),
        "0x38.bsc" | "bsc" => Some(56),
        "0xa.optimism" | "optimism" => Some(10),
        "0x89.polygon" | "polygon" => Some(137),
        "0xa86a.avax" | "avalanche" | "avax" => Some(43114),
        "0x1.ethereum" | "ethereum" => Some(1),
        // ICON spoke transactions are signed on Ethereum.
        "icon" => Some(1),
        _ => None,
    };

    mapped.or_else(|| parse_structured_id(platform_chain_id))
}

fn parse_structured_id(platform_chain_id: &str) -> Option<u64> {
    let (prefix, name) = platform_chain_id.split_once('.')?;
    if name.is_empty() {
        return None;
    }
    let hex = prefix.strip_prefix("0x")?;
    u64::from_str_radix(hex, 16).ok()
}

/// Blockchain id the swap backend expects for a platform chain id.
pub fn to_backend_chain_id(platform_chain_id: &str) -> Result<&'static str> {
    let backend_id = match platform_chain_id {
        "sonic" => "sonic",
        "0xa4b1.arbitrum" | "arbitrum" => "0xa4b1.arbitrum",
        "0x1.ethereum" | "ethereum" => "ethereum",
        "0x2105.base" | "base" => "0x2105.base",
        "0x38.bsc" | "bsc" => "0x38.bsc",
        "0xa.optimism" | "optimism" => "0xa.optimism",
        "0x89.polygon" | "polygon" => "0x89.polygon",
        "0xa86a.avax" | "avalanche" | "avax" => "0xa86a.avax",
        "0x1.icon" | "icon" => "0x1.icon",
        _ => {
            return Err(AppError::UnsupportedChain(platform_chain_id.to_string()));
        }
    };
    Ok(backend_id)
}

/// Whether the wallet can sign on this chain.
pub fn is_network_compatible(platform_chain_id: &str) -> bool {
    to_network_id(platform_chain_id).is_some()
}

/// Pre-flight gate for quote and swap calls.
pub fn assert_swappable(platform_chain_id: &str) -> Result<()> {
    to_backend_chain_id(platform_chain_id).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_id_from_table() {
        assert_eq!(to_network_id("sonic"), Some(146));
        assert_eq!(to_network_id("0xa4b1.arbitrum"), Some(42161));
        assert_eq!(to_network_id("arbitrum"), Some(42161));
        assert_eq!(to_network_id("avax"), Some(43114));
        assert_eq!(to_network_id("icon"), Some(1));
    }

    #[test]
    fn test_network_id_from_structured_id() {
        assert_eq!(to_network_id("0x2019.kaia"), Some(0x2019));
        assert_eq!(to_network_id("0x1.icon"), Some(1));
        assert_eq!(to_network_id("0xzz.bad"), None);
        assert_eq!(to_network_id("0x10."), None);
        assert_eq!(to_network_id("solana"), None);
        assert_eq!(to_network_id("injective-1"), None);
    }

    #[test]
    fn test_backend_chain_id() {
        assert_eq!(to_backend_chain_id("ethereum").unwrap(), "ethereum");
        assert_eq!(to_backend_chain_id("0x1.ethereum").unwrap(), "ethereum");
        assert_eq!(to_backend_chain_id("base").unwrap(), "0x2105.base");
        assert_eq!(to_backend_chain_id("avalanche").unwrap(), "0xa86a.avax");
        assert!(matches!(to_backend_chain_id("solana"), Err(AppError::UnsupportedChain(_))));
    }

    #[test]
    fn test_compatibility_and_swappability_can_differ() {
        // Kaia is signable by an EVM wallet but has no backend route.
        assert!(is_network_compatible("0x2019.kaia"));
        assert!(assert_swappable("0x2019.kaia").is_err());

        assert!(!is_network_compatible("solana"));
        assert!(assert_swappable("sonic").is_ok());
    }

    #[test]
    fn test_every_swappable_chain_has_a_network_id() {
        for chain in SUPPORTED_CHAINS {
            if assert_swappable(chain).is_ok() {
                assert!(is_network_compatible(chain), "{} has no network id", chain);
            }
        }
    }
}
