use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    generate_account_number, Account, AccountId, Cents, TransactionKind, TransactionRecord,
};

use super::{UnitOfWork, MIGRATION_001_INITIAL};

pub(crate) const ACCOUNT_COLUMNS: &str =
    "id, full_name, username, password_hash, account_number, balance_cents, created_at";

/// UNIQUE keys of the `accounts` table, as SQLite names them in violations.
pub const USERNAME_KEY: &str = "accounts.username";
pub const ACCOUNT_NUMBER_KEY: &str = "accounts.account_number";

pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, account_id, kind, amount_cents, recipient_account_number, created_at";

/// Repository for persisting and querying accounts and their transaction log.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run more than once.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        tracing::debug!("database schema is up to date");
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Open an atomic unit of work. Nothing it writes is visible until
    /// [`UnitOfWork::commit`]; dropping it rolls back.
    pub async fn begin(&self) -> Result<UnitOfWork> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(UnitOfWork::new(tx))
    }

    // ========================
    // Account operations
    // ========================

    /// Create and persist an account with a freshly drawn account number.
    ///
    /// A number taken between the existence check and the insert is caught by
    /// the UNIQUE constraint and redrawn. Any other failure, including a
    /// username clash, is returned.
    pub async fn create_account(
        &self,
        full_name: String,
        username: String,
        password_hash: String,
        initial_balance: Cents,
    ) -> Result<Account> {
        loop {
            let candidate = generate_account_number(&mut rand::thread_rng());
            if self.account_number_exists(&candidate).await? {
                tracing::debug!(account_number = %candidate, "account number collision, drawing again");
                continue;
            }

            let account = Account::new(
                full_name.clone(),
                username.clone(),
                password_hash.clone(),
                candidate,
                initial_balance,
            );
            match self.save_account(&account).await {
                Ok(()) => return Ok(account),
                Err(e) if violates_unique(&e, ACCOUNT_NUMBER_KEY) => {
                    tracing::debug!(
                        account_number = %account.account_number,
                        "account number taken on insert, drawing again"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Save a new account to the database.
    pub async fn save_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, full_name, username, password_hash, account_number, balance_cents, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.full_name)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.account_number)
        .bind(account.balance_cents)
        .bind(account.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;
        Ok(())
    }

    pub async fn account_number_exists(&self, account_number: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM accounts WHERE account_number = ?")
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check account number")?;
        Ok(row.is_some())
    }

    /// Get an account by ID.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account")?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// Get an account by username (exact, case-sensitive match).
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by username")?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// Get an account by its 8-digit account number.
    pub async fn find_by_account_number(&self, account_number: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = ?"
        ))
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by number")?;

        row.as_ref().map(row_to_account).transpose()
    }

    // ========================
    // Transaction log
    // ========================

    /// List an account's transaction records in creation order.
    pub async fn list_transactions(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE account_id = ? ORDER BY id"
        ))
        .bind(account_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(row_to_transaction).collect()
    }

    /// Count every transaction record in the log.
    pub async fn count_transactions(&self) -> Result<i64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM transactions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?
            .get("count");
        Ok(count)
    }

    /// Count every account.
    pub async fn count_accounts(&self) -> Result<i64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM accounts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count accounts")?
            .get("count");
        Ok(count)
    }
}

/// Returns true if the error was caused by a UNIQUE constraint violation on
/// `key`, given as `table.column` (e.g. [`USERNAME_KEY`]).
///
/// SQLite reports the failing key in the message: `UNIQUE constraint failed: accounts.username`.
pub fn violates_unique(err: &anyhow::Error, key: &str) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| {
                db.is_unique_violation()
                    && db
                        .message()
                        .rsplit(": ")
                        .next()
                        .is_some_and(|keys| keys.split(", ").any(|k| k == key))
            })
    })
}

pub(crate) fn row_to_account(row: &SqliteRow) -> Result<Account> {
    let id_str: String = row.get("id");
    let created_at_str: String = row.get("created_at");

    Ok(Account {
        id: Uuid::parse_str(&id_str).context("Invalid account ID")?,
        full_name: row.get("full_name"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        account_number: row.get("account_number"),
        balance_cents: row.get("balance_cents"),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .context("Invalid created_at timestamp")?
            .with_timezone(&Utc),
    })
}

pub(crate) fn row_to_transaction(row: &SqliteRow) -> Result<TransactionRecord> {
    let account_id_str: String = row.get("account_id");
    let kind_str: String = row.get("kind");
    let created_at_str: String = row.get("created_at");

    Ok(TransactionRecord {
        id: row.get("id"),
        account_id: Uuid::parse_str(&account_id_str).context("Invalid account ID")?,
        kind: TransactionKind::from_str(&kind_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
        amount_cents: row.get("amount_cents"),
        recipient_account_number: row.get("recipient_account_number"),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .context("Invalid created_at timestamp")?
            .with_timezone(&Utc),
    })
}
