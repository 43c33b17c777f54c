use chrono::{DateTime, Utc};

use super::{AccountId, Cents};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    /// Outgoing transfer, recorded against the sender only
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Transfer => "transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            "transfer" => Some(TransactionKind::Transfer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::Transfer => "Transfer",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An append-only log entry describing one balance-affecting event.
/// Records are never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Assigned by the store on insert, monotonically increasing
    pub id: TransactionId,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    /// Always positive
    pub amount_cents: Cents,
    /// Present only for transfers
    pub recipient_account_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a new record. The id must be assigned by the repository.
    fn new(account_id: AccountId, kind: TransactionKind, amount_cents: Cents) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: 0, // Will be set by repository
            account_id,
            kind,
            amount_cents,
            recipient_account_number: None,
            created_at: Utc::now(),
        }
    }

    pub fn deposit(account_id: AccountId, amount_cents: Cents) -> Self {
        Self::new(account_id, TransactionKind::Deposit, amount_cents)
    }

    pub fn withdrawal(account_id: AccountId, amount_cents: Cents) -> Self {
        Self::new(account_id, TransactionKind::Withdrawal, amount_cents)
    }

    pub fn transfer(
        account_id: AccountId,
        amount_cents: Cents,
        recipient_account_number: impl Into<String>,
    ) -> Self {
        let mut record = Self::new(account_id, TransactionKind::Transfer, amount_cents);
        record.recipient_account_number = Some(recipient_account_number.into());
        record
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::Transfer,
        ] {
            assert_eq!(TransactionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::from_str("Deposit"), None);
    }

    #[test]
    fn test_only_transfers_carry_a_recipient() {
        let owner = Uuid::new_v4();

        let deposit = TransactionRecord::deposit(owner, 500);
        assert_eq!(deposit.kind, TransactionKind::Deposit);
        assert_eq!(deposit.recipient_account_number, None);

        let withdrawal = TransactionRecord::withdrawal(owner, 500);
        assert_eq!(withdrawal.recipient_account_number, None);

        let transfer = TransactionRecord::transfer(owner, 500, "87654321");
        assert_eq!(transfer.kind, TransactionKind::Transfer);
        assert_eq!(transfer.recipient_account_number.as_deref(), Some("87654321"));
        assert_eq!(transfer.account_id, owner);
    }

    #[test]
    #[should_panic(expected = "Transaction amount must be positive")]
    fn test_record_requires_positive_amount() {
        TransactionRecord::deposit(Uuid::new_v4(), 0);
    }
}
