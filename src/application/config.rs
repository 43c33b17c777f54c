use crate::domain::Cents;

/// Default minimum opening deposit: 2000 naira.
pub const DEFAULT_MINIMUM_OPENING_DEPOSIT: Cents = 200_000;

/// Tunables for the bank service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankConfig {
    /// Smallest initial deposit accepted at sign-up
    pub minimum_opening_deposit: Cents,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            minimum_opening_deposit: DEFAULT_MINIMUM_OPENING_DEPOSIT,
        }
    }
}
