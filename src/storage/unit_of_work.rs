use anyhow::{Context, Result};
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::{Account, AccountId, Cents, TransactionRecord};

use super::repository::{row_to_account, ACCOUNT_COLUMNS};

/// An open database transaction covering one ledger operation.
///
/// Every balance change and log append made through it becomes visible
/// together on [`commit`](Self::commit). Dropping it without committing
/// rolls everything back.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Re-read an account inside the transaction.
    pub async fn find_by_id(&mut self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to fetch account")?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// Look up an account by number inside the transaction.
    pub async fn find_by_account_number(&mut self, account_number: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = ?"
        ))
        .bind(account_number)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch account by number")?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// Apply `delta` to an account balance and return the new balance.
    ///
    /// Returns `None` when the account does not exist or the result would be
    /// negative; in that case nothing is written.
    pub async fn adjust_balance(&mut self, account_id: AccountId, delta: Cents) -> Result<Option<Cents>> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents + ?
            WHERE id = ? AND balance_cents + ? >= 0
            RETURNING balance_cents
            "#,
        )
        .bind(delta)
        .bind(account_id.to_string())
        .bind(delta)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to adjust balance")?;

        Ok(row.map(|row| row.get("balance_cents")))
    }

    /// Append a record to the transaction log and assign its id.
    pub async fn append_transaction(&mut self, record: &mut TransactionRecord) -> Result<()> {
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (account_id, kind, amount_cents, recipient_account_number, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(record.account_id.to_string())
        .bind(record.kind.as_str())
        .bind(record.amount_cents)
        .bind(&record.recipient_account_number)
        .bind(record.created_at.to_rfc3339())
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to append transaction")?;

        record.id = row.get("id");
        Ok(())
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }
}
