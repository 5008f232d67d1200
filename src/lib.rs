pub mod amount;
pub mod api;
pub mod chains;
pub mod clock;
pub mod config;
pub mod db;
pub mod dex;
pub mod enums;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use enums::{ QuoteMode, SwapStep, TxStatus };
pub use error::{ AppError, ErrorCode, Result, SwapError };
