use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::Cents;

pub type AccountId = Uuid;

/// Smallest and largest 8-digit account numbers.
pub const ACCOUNT_NUMBER_MIN: u32 = 10_000_000;
pub const ACCOUNT_NUMBER_MAX: u32 = 99_999_999;

/// A customer's identity plus their funds balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub full_name: String,
    /// Unique, compared case-sensitively
    pub username: String,
    /// Hex SHA-256 digest, only ever compared for equality
    pub password_hash: String,
    /// Unique 8-digit string, never reassigned
    pub account_number: String,
    /// Never negative
    pub balance_cents: Cents,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        full_name: String,
        username: String,
        password_hash: String,
        account_number: String,
        balance_cents: Cents,
    ) -> Self {
        assert!(balance_cents >= 0, "Account balance cannot be negative");
        Self {
            id: Uuid::new_v4(),
            full_name,
            username,
            password_hash,
            account_number,
            balance_cents,
            created_at: Utc::now(),
        }
    }

    pub fn can_cover(&self, amount_cents: Cents) -> bool {
        amount_cents <= self.balance_cents
    }
}

/// Draw a random 8-digit account number. Uniqueness is checked by the store.
pub fn generate_account_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX)
        .to_string()
}
