// Application layer - the ledger engine and its use cases.
// Clients (the console session, tests) talk to `BankService` only.

pub mod config;
pub mod error;
pub mod service;

pub use config::*;
pub use error::*;
pub use service::*;
