use thiserror::Error;

use crate::domain::{format_cents, Cents};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Minimum deposit required is {} naira, got {}", money(.minimum), money(.amount))]
    BelowMinimum { amount: Cents, minimum: Cents },

    #[error("Insufficient funds: balance {}, required {}", money(.balance), money(.required))]
    InsufficientFunds { balance: Cents, required: Cents },

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidSignUp(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

fn money(cents: &Cents) -> String {
    format_cents(*cents)
}
