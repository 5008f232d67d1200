/// Block explorer for a numeric network id.
fn explorer(network_id: u64) -> Option<(&'static str, &'static str)> {
    match network_id {
        1 => Some(("Etherscan", "https://etherscan.io")),
        42161 => Some(("Arbiscan", "https://arbiscan.io")),
        8453 => Some(("Basescan", "https://basescan.org")),
        56 => Some(("BscScan", "https://bscscan.com")),
        10 => Some(("Optimism Explorer", "https://optimistic.etherscan.io")),
        137 => Some(("Polygonscan", "https://polygonscan.com")),
        43114 => Some(("Snowtrace", "https://snowtrace.io")),
        146 => Some(("Sonic Explorer", "https://sonicscan.org")),
        _ => None,
    }
}

/// Transaction page URL, if an explorer is known for the network.
pub fn explorer_tx_url(network_id: u64, tx_hash: &str) -> Option<String> {
    match explorer(network_id) {
        Some((_, url)) => Some(format!("{}/tx/{}", url, tx_hash)),
        None => {
            tracing::warn!("No block explorer configured for network {}", network_id);
            None
        }
    }
}

pub fn explorer_name(network_id: u64) -> &'static str {
    explorer(network_id)
        .map(|(name, _)| name)
        .unwrap_or("Block Explorer")
}
