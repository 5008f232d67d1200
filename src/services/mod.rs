pub mod quote_service;
pub mod quote_session;
pub mod swap_service;

pub use quote_service::QuoteService;
pub use quote_session::{ QuoteInputs, QuoteSession, QuoteSnapshot };
pub use swap_service::{ SwapReceipt, SwapService };
