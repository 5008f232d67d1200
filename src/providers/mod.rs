pub mod catalog;
pub mod signing;

pub use catalog::{ CachedCatalog, CatalogSnapshot, FileCatalog, TokenCatalog };
pub use signing::{ SigningProvider, TransactionReceipt, TransactionRequest, WalletConnector };
