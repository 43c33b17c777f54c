use std::fmt::Display;
use std::io::{BufRead, Write};

use anyhow::Result;

use crate::application::{AppError, BankService, SignUpRequest};
use crate::domain::{
    format_cents, normalize_full_name, validate_full_name, validate_password, validate_username,
    Account, TransactionKind,
};

const MAIN_MENU: &str = "
    1. Sign Up
    2. Log In
    3. Quit
";

const DASHBOARD_MENU: &str = "
    1. Deposit
    2. Withdraw
    3. Balance Check
    4. Transaction History
    5. Transfer Money
    6. Account Details
    7. Logout
";

/// Whether the session should keep going after a flow returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive text session over any line-based input and output.
///
/// End of input at any prompt ends the session.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main menu until the user quits or input ends.
    pub async fn run(&mut self, service: &BankService) -> Result<()> {
        loop {
            self.say(MAIN_MENU)?;
            let Some(choice) = self.prompt("Choose an option from the menu above: ")? else {
                break;
            };

            let flow = match choice.as_str() {
                "1" => self.sign_up(service).await?,
                "2" => self.log_in(service).await?,
                "3" => Flow::Quit,
                _ => {
                    self.say("Invalid choice, please try again.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                break;
            }
        }

        self.say("Exiting the program...")?;
        Ok(())
    }

    async fn sign_up(&mut self, service: &BankService) -> Result<Flow> {
        self.say("\n******************** Sign Up ********************\n")?;

        let full_name = loop {
            let Some(input) = self.prompt("Enter your full name: ")? else {
                return Ok(Flow::Quit);
            };
            let full_name = normalize_full_name(&input);
            match validate_full_name(&full_name) {
                Ok(()) => break full_name,
                Err(reason) => self.say(reason)?,
            }
        };

        let username = loop {
            let Some(username) = self.prompt("Enter username: ")? else {
                return Ok(Flow::Quit);
            };
            if let Err(reason) = validate_username(&username) {
                self.say(reason)?;
                continue;
            }
            match service.username_taken(&username).await {
                Ok(false) => break username,
                Ok(true) => self.say("Username already taken.")?,
                Err(err) => {
                    self.say(&err)?;
                    return Ok(Flow::Continue);
                }
            }
        };

        let password = loop {
            let Some(password) = self.prompt("Enter your password: ")? else {
                return Ok(Flow::Quit);
            };
            if let Err(reason) = validate_password(&password) {
                self.say(reason)?;
                continue;
            }
            let Some(confirm) = self.prompt("Confirm your password: ")? else {
                return Ok(Flow::Quit);
            };
            if password != confirm {
                self.say("Passwords do not match.")?;
                continue;
            }
            break password;
        };

        let minimum = format_cents(service.config().minimum_opening_deposit);
        let initial_deposit = loop {
            let label = format!("Enter initial deposit amount (min {} naira): ", minimum);
            let Some(input) = self.prompt(&label)? else {
                return Ok(Flow::Quit);
            };
            match service.parse_opening_deposit(&input) {
                Ok(_) => break input,
                Err(err) => self.say(&err)?,
            }
        };

        let request = SignUpRequest {
            full_name,
            username,
            password,
            initial_deposit,
        };
        match service.sign_up(request).await {
            Ok(account) => {
                self.say(format!(
                    "Sign-up successful! Your account number is {}.",
                    account.account_number
                ))?;
                self.dashboard(service, account).await
            }
            Err(err) => {
                self.say(&err)?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn log_in(&mut self, service: &BankService) -> Result<Flow> {
        self.say("\n******************** Log In ********************\n")?;

        let Some(username) = self.prompt("Enter your username: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(password) = self.prompt("Enter your password: ")? else {
            return Ok(Flow::Quit);
        };

        match service.log_in(&username, &password).await {
            Ok(account) => {
                self.say("Log in successful!")?;
                self.dashboard(service, account).await
            }
            Err(err) => {
                self.say(&err)?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dashboard(&mut self, service: &BankService, account: Account) -> Result<Flow> {
        self.say("\n******************** User Dashboard ********************\n")?;
        self.say(format!("Welcome, {}!", account.full_name))?;

        loop {
            self.say(DASHBOARD_MENU)?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(Flow::Quit);
            };

            let flow = match choice.as_str() {
                "1" => self.deposit(service, &account).await?,
                "2" => self.withdraw(service, &account).await?,
                "3" => {
                    match service.balance(account.id).await {
                        Ok(balance) => self.say(format!("Your balance: {}", format_cents(balance)))?,
                        Err(err) => self.say(&err)?,
                    }
                    Flow::Continue
                }
                "4" => {
                    self.history(service, &account).await?;
                    Flow::Continue
                }
                "5" => self.transfer(service, &account).await?,
                "6" => {
                    match service.get_account(account.id).await {
                        Ok(current) => self.say(format!(
                            "Full Name: {}, Username: {}, Account Number: {}",
                            current.full_name, current.username, current.account_number
                        ))?,
                        Err(err) => self.say(&err)?,
                    }
                    Flow::Continue
                }
                "7" => {
                    self.say("Logging out... Thank you for using our service!")?;
                    return Ok(Flow::Continue);
                }
                _ => {
                    self.say("Invalid choice. Try again.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
    }

    async fn deposit(&mut self, service: &BankService, account: &Account) -> Result<Flow> {
        let Some(amount) = self.prompt("Enter deposit amount: ")? else {
            return Ok(Flow::Quit);
        };
        match service.deposit(account.id, &amount).await {
            Ok(outcome) => self.say(format!(
                "Deposit successful! New balance: {}",
                format_cents(outcome.balance)
            ))?,
            Err(err) => self.say(&err)?,
        }
        Ok(Flow::Continue)
    }

    async fn withdraw(&mut self, service: &BankService, account: &Account) -> Result<Flow> {
        let Some(amount) = self.prompt("Enter withdrawal amount: ")? else {
            return Ok(Flow::Quit);
        };
        match service.withdraw(account.id, &amount).await {
            Ok(outcome) => self.say(format!(
                "Withdrawal successful! You withdrew {}. Your new balance is {}.",
                format_cents(outcome.record.amount_cents),
                format_cents(outcome.balance)
            ))?,
            Err(err) => self.say(&err)?,
        }
        Ok(Flow::Continue)
    }

    async fn history(&mut self, service: &BankService, account: &Account) -> Result<()> {
        let records = match service.history(account.id).await {
            Ok(records) => records,
            Err(err) => return self.say(&err),
        };

        if records.is_empty() {
            return self.say("No transactions found.");
        }
        for record in records {
            let mut line = format!(
                "{} of {} on {}",
                record.kind,
                format_cents(record.amount_cents),
                record.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            if let (TransactionKind::Transfer, Some(to)) =
                (record.kind, &record.recipient_account_number)
            {
                line.push_str(&format!(" to {}", to));
            }
            self.say(line)?;
        }
        Ok(())
    }

    async fn transfer(&mut self, service: &BankService, account: &Account) -> Result<Flow> {
        let Some(recipient) = self.prompt("Enter recipient account number: ")? else {
            return Ok(Flow::Quit);
        };
        if let Err(err) = service.resolve_recipient(account.id, &recipient).await {
            self.say(&err)?;
            return Ok(Flow::Continue);
        }

        let Some(amount) = self.prompt("Enter transfer amount: ")? else {
            return Ok(Flow::Quit);
        };
        match service.transfer(account.id, &recipient, &amount).await {
            Ok(outcome) => self.say(format!(
                "Transfer successful! You sent {} to account {} ({}). Your new balance is {}.",
                format_cents(outcome.record.amount_cents),
                outcome.recipient_account_number,
                outcome.recipient_name,
                format_cents(outcome.sender_balance)
            ))?,
            Err(AppError::Database(err)) => {
                tracing::error!(error = %err, "transfer failed");
                self.say(format!("Transfer failed: {}", err))?;
            }
            Err(err) => self.say(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Show `label` and read one trimmed line. `None` means input has ended.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
