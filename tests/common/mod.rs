// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use kobo::application::{BankService, SignUpRequest};
use kobo::domain::Account;
use tempfile::TempDir;

/// A password that satisfies the complexity rules.
pub const PASSWORD: &str = "Secret1!";

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BankService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

pub fn sign_up_request(full_name: &str, username: &str, initial_deposit: &str) -> SignUpRequest {
    SignUpRequest {
        full_name: full_name.to_string(),
        username: username.to_string(),
        password: PASSWORD.to_string(),
        initial_deposit: initial_deposit.to_string(),
    }
}

/// Open an account with the standard password.
pub async fn open_account(
    service: &BankService,
    full_name: &str,
    username: &str,
    initial_deposit: &str,
) -> Result<Account> {
    Ok(service
        .sign_up(sign_up_request(full_name, username, initial_deposit))
        .await?)
}

/// Test fixture: two funded customers
pub struct Customers {
    pub ada: Account,
    pub bayo: Account,
}

impl Customers {
    /// Ada and Bayo, each opened with the 2000 minimum
    pub async fn open(service: &BankService) -> Result<Self> {
        let ada = open_account(service, "Ada Obi", "adaobi", "2000").await?;
        let bayo = open_account(service, "Bayo Ade", "bayo", "2000").await?;
        Ok(Self { ada, bayo })
    }
}
