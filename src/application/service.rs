use crate::domain::{
    format_cents, hash_password, normalize_full_name, parse_amount, parse_cents,
    validate_full_name, validate_password, validate_username, Account, AccountId, AmountError,
    Cents, TransactionRecord,
};
use crate::storage::{violates_unique, Repository, UnitOfWork, USERNAME_KEY};

use super::{AppError, BankConfig};

/// Application service applying ledger operations to the account store.
/// This is the primary interface for any client (console session, tests, etc.).
pub struct BankService {
    repo: Repository,
    config: BankConfig,
}

/// Everything needed to open an account. Fields are raw user input.
pub struct SignUpRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub initial_deposit: String,
}

/// Result of a deposit or withdrawal
#[derive(Debug)]
pub struct LedgerOutcome {
    pub record: TransactionRecord,
    pub balance: Cents,
}

/// Result of a transfer
#[derive(Debug)]
pub struct TransferOutcome {
    pub record: TransactionRecord,
    pub sender_balance: Cents,
    pub recipient_name: String,
    pub recipient_account_number: String,
}

impl BankService {
    /// Create a new bank service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            config: BankConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BankConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    /// Create (if needed) and migrate the database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Accounts
    // ========================

    /// Open a new account funded with the initial deposit.
    ///
    /// The funding is part of account creation, so no transaction record is written.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Account, AppError> {
        let full_name = normalize_full_name(&request.full_name);
        validate_full_name(&full_name).map_err(|e| reject(AppError::InvalidSignUp(e.into())))?;

        let username = request.username.trim().to_string();
        validate_username(&username).map_err(|e| reject(AppError::InvalidSignUp(e.into())))?;

        validate_password(&request.password)
            .map_err(|e| reject(AppError::InvalidSignUp(e.into())))?;

        let initial_balance = self.parse_opening_deposit(&request.initial_deposit)?;

        if self.repo.find_by_username(&username).await?.is_some() {
            return Err(reject(AppError::DuplicateUsername(username)));
        }

        let account = self
            .repo
            .create_account(
                full_name,
                username.clone(),
                hash_password(&request.password),
                initial_balance,
            )
            .await
            .map_err(|e| {
                if violates_unique(&e, USERNAME_KEY) {
                    reject(AppError::DuplicateUsername(username))
                } else {
                    AppError::Database(e)
                }
            })?;

        tracing::info!(
            account_number = %account.account_number,
            balance = %format_cents(account.balance_cents),
            "account opened"
        );
        Ok(account)
    }

    /// Validate the sign-up funding amount against the configured minimum.
    pub fn parse_opening_deposit(&self, input: &str) -> Result<Cents, AppError> {
        let amount = parse_cents(input)
            .map_err(|e| reject(AppError::InvalidAmount(e.to_string())))?;
        if amount < 0 {
            return Err(reject(AppError::InvalidAmount(
                "deposit cannot be negative".to_string(),
            )));
        }
        let minimum = self.config.minimum_opening_deposit;
        if amount < minimum {
            return Err(reject(AppError::BelowMinimum { amount, minimum }));
        }
        Ok(amount)
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.repo.find_by_username(username.trim()).await?.is_some())
    }

    /// Authenticate a customer by exact username and password.
    pub async fn log_in(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let account = self
            .repo
            .find_by_username(username.trim())
            .await?
            .filter(|account| account.password_hash == hash_password(password));

        match account {
            Some(account) => {
                tracing::info!(account_number = %account.account_number, "logged in");
                Ok(account)
            }
            None => Err(reject(AppError::InvalidCredentials)),
        }
    }

    /// Get the current state of an account.
    pub async fn get_account(&self, account_id: AccountId) -> Result<Account, AppError> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))
    }

    /// Current balance, always re-read from the store.
    pub async fn balance(&self, account_id: AccountId) -> Result<Cents, AppError> {
        Ok(self.get_account(account_id).await?.balance_cents)
    }

    /// All transaction records of an account, oldest first.
    pub async fn history(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>, AppError> {
        let account = self.get_account(account_id).await?;
        Ok(self.repo.list_transactions(account.id).await?)
    }

    /// Check that `account_number` names an account other than the sender's.
    pub async fn resolve_recipient(
        &self,
        sender_id: AccountId,
        account_number: &str,
    ) -> Result<Account, AppError> {
        let account_number = account_number.trim();
        let recipient = self
            .repo
            .find_by_account_number(account_number)
            .await?
            .ok_or_else(|| no_such_recipient(account_number))?;
        if recipient.id == sender_id {
            return Err(reject(AppError::InvalidRecipient(
                "cannot transfer to your own account".to_string(),
            )));
        }
        Ok(recipient)
    }

    // ========================
    // Ledger operations
    // ========================

    /// Add funds to an account.
    pub async fn deposit(&self, account_id: AccountId, amount: &str) -> Result<LedgerOutcome, AppError> {
        let amount_cents = parse_positive(amount)?;

        let mut uow = self.repo.begin().await?;
        let account = load_account(&mut uow, account_id).await?;
        if account.balance_cents.checked_add(amount_cents).is_none() {
            return Err(reject(AppError::InvalidAmount("amount is too large".to_string())));
        }

        let balance = uow
            .adjust_balance(account.id, amount_cents)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

        let mut record = TransactionRecord::deposit(account.id, amount_cents);
        uow.append_transaction(&mut record).await?;
        uow.commit().await?;

        tracing::info!(
            account_number = %account.account_number,
            amount = %format_cents(amount_cents),
            balance = %format_cents(balance),
            "deposit committed"
        );
        Ok(LedgerOutcome { record, balance })
    }

    /// Take funds out of an account. The balance may reach zero but never go below.
    pub async fn withdraw(&self, account_id: AccountId, amount: &str) -> Result<LedgerOutcome, AppError> {
        let amount_cents = parse_positive(amount)?;

        let mut uow = self.repo.begin().await?;
        let account = load_account(&mut uow, account_id).await?;
        if !account.can_cover(amount_cents) {
            return Err(insufficient(account.balance_cents, amount_cents));
        }

        let balance = uow
            .adjust_balance(account.id, -amount_cents)
            .await?
            .ok_or_else(|| insufficient(account.balance_cents, amount_cents))?;

        let mut record = TransactionRecord::withdrawal(account.id, amount_cents);
        uow.append_transaction(&mut record).await?;
        uow.commit().await?;

        tracing::info!(
            account_number = %account.account_number,
            amount = %format_cents(amount_cents),
            balance = %format_cents(balance),
            "withdrawal committed"
        );
        Ok(LedgerOutcome { record, balance })
    }

    /// Move funds to another customer's account.
    ///
    /// The debit, the credit and the sender's transfer record are committed
    /// as one unit; any failure leaves both balances untouched.
    pub async fn transfer(
        &self,
        sender_id: AccountId,
        recipient_account_number: &str,
        amount: &str,
    ) -> Result<TransferOutcome, AppError> {
        let amount_cents = parse_positive(amount)?;
        let recipient_account_number = recipient_account_number.trim();

        let mut uow = self.repo.begin().await?;
        let sender = load_account(&mut uow, sender_id).await?;
        let recipient = uow
            .find_by_account_number(recipient_account_number)
            .await?
            .ok_or_else(|| no_such_recipient(recipient_account_number))?;
        if recipient.id == sender.id {
            return Err(reject(AppError::InvalidRecipient(
                "cannot transfer to your own account".to_string(),
            )));
        }

        if !sender.can_cover(amount_cents) {
            return Err(insufficient(sender.balance_cents, amount_cents));
        }
        if recipient.balance_cents.checked_add(amount_cents).is_none() {
            return Err(reject(AppError::InvalidAmount("amount is too large".to_string())));
        }

        let sender_balance = uow
            .adjust_balance(sender.id, -amount_cents)
            .await?
            .ok_or_else(|| insufficient(sender.balance_cents, amount_cents))?;
        uow.adjust_balance(recipient.id, amount_cents)
            .await?
            .ok_or_else(|| no_such_recipient(recipient_account_number))?;

        let mut record =
            TransactionRecord::transfer(sender.id, amount_cents, &recipient.account_number);
        uow.append_transaction(&mut record).await?;
        uow.commit().await?;

        tracing::info!(
            from = %sender.account_number,
            to = %recipient.account_number,
            amount = %format_cents(amount_cents),
            balance = %format_cents(sender_balance),
            "transfer committed"
        );
        Ok(TransferOutcome {
            record,
            sender_balance,
            recipient_name: recipient.full_name,
            recipient_account_number: recipient.account_number,
        })
    }
}

/// Parse a deposit, withdrawal or transfer amount before touching the store.
fn parse_positive(input: &str) -> Result<Cents, AppError> {
    parse_amount(input).map_err(|e| {
        let reason = match e {
            AmountError::InvalidFormat => format!("'{}' is not a numeric amount", input.trim()),
            AmountError::TooPrecise | AmountError::NotPositive => e.to_string(),
        };
        reject(AppError::InvalidAmount(reason))
    })
}

async fn load_account(uow: &mut UnitOfWork, account_id: AccountId) -> Result<Account, AppError> {
    uow.find_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))
}

fn insufficient(balance: Cents, required: Cents) -> AppError {
    reject(AppError::InsufficientFunds { balance, required })
}

fn no_such_recipient(account_number: &str) -> AppError {
    reject(AppError::InvalidRecipient(format!(
        "no account with number '{}'",
        account_number
    )))
}

fn reject(err: AppError) -> AppError {
    tracing::debug!(error = %err, "operation rejected");
    err
}
