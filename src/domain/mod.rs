mod account;
mod credentials;
mod money;
mod transaction;

pub use account::*;
pub use credentials::*;
pub use money::*;
pub use transaction::*;
