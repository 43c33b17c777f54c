mod common;

use anyhow::Result;
use common::{test_service, Customers};
use kobo::application::AppError;
use kobo::domain::TransactionKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

#[tokio::test]
async fn test_reference_scenario() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let ada = common::open_account(&service, "Ada Obi", "adaobi", "2000").await?;
    assert_eq!(ada.balance_cents, 200000);

    let outcome = service.deposit(ada.id, "500").await?;
    assert_eq!(outcome.balance, 250000);
    let history = service.history(ada.id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransactionKind::Deposit);
    assert_eq!(history[0].amount_cents, 50000);
    assert_eq!(history[0].recipient_account_number, None);

    let bayo = common::open_account(&service, "Bayo Ade", "bayo", "2000").await?;
    service
        .transfer(ada.id, &bayo.account_number, "1000")
        .await?;
    assert_eq!(service.balance(ada.id).await?, 150000);
    assert_eq!(service.balance(bayo.id).await?, 300000);

    let history = service.history(ada.id).await?;
    let transfers: Vec<_> = history
        .iter()
        .filter(|r| r.kind == TransactionKind::Transfer)
        .collect();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].amount_cents, 100000);
    assert_eq!(
        transfers[0].recipient_account_number.as_deref(),
        Some(bayo.account_number.as_str())
    );
    // Transfers are attributed to the sender only
    assert!(service.history(bayo.id).await?.is_empty());

    let err = service.withdraw(ada.id, "5000").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientFunds {
            balance: 150000,
            required: 500000
        }
    ));
    assert_eq!(service.balance(ada.id).await?, 150000);
    assert_eq!(service.history(ada.id).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_deposit_rejects_invalid_amounts() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let Customers { ada, .. } = Customers::open(&service).await?;

    for amount in ["0", "-5", "abc", "", "12.3.4", "0.001"] {
        let result = service.deposit(ada.id, amount).await;
        assert!(
            matches!(result, Err(AppError::InvalidAmount(_))),
            "amount {amount:?} should be rejected"
        );
    }

    assert_eq!(service.balance(ada.id).await?, 200000);
    assert!(service.history(ada.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sub_kobo_amounts_are_rejected_without_state_change() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let Customers { ada, bayo } = Customers::open(&service).await?;

    let err = service.deposit(ada.id, "100.999").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid amount: more than two decimal places");

    let err = service.deposit(ada.id, "0.009").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid amount: more than two decimal places");

    let err = service.withdraw(ada.id, "10.001").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    let err = service
        .transfer(ada.id, &bayo.account_number, "10.009")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    assert_eq!(service.balance(ada.id).await?, 200000);
    assert_eq!(service.balance(bayo.id).await?, 200000);
    assert_eq!(service.repository().count_transactions().await?, 0);

    // Zeros past the second decimal place do not change the value
    let outcome = service.deposit(ada.id, "10.500").await?;
    assert_eq!(outcome.record.amount_cents, 1050);
    Ok(())
}

#[tokio::test]
async fn test_deposit_then_withdraw_restores_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let Customers { ada, .. } = Customers::open(&service).await?;

    let before = service.balance(ada.id).await?;
    service.deposit(ada.id, "123.45").await?;
    let outcome = service.withdraw(ada.id, "123.45").await?;

    assert_eq!(outcome.balance, before);
    assert_eq!(outcome.record.kind, TransactionKind::Withdrawal);
    assert_eq!(outcome.record.amount_cents, 12345);
    Ok(())
}

#[tokio::test]
async fn test_withdraw_entire_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let Customers { ada, .. } = Customers::open(&service).await?;

    let outcome = service.withdraw(ada.id, "2000.00").await?;
    assert_eq!(outcome.balance, 0);

    let err = service.withdraw(ada.id, "0.01").await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { balance: 0, required: 1 }));
    Ok(())
}

#[tokio::test]
async fn test_withdraw_rejects_invalid_amounts() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let Customers { ada, .. } = Customers::open(&service).await?;

    for amount in ["0", "-100", "lots"] {
        let result = service.withdraw(ada.id, amount).await;
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }
    assert_eq!(service.balance(ada.id).await?, 200000);
    Ok(())
}

#[tokio::test]
async fn test_history_is_in_creation_order() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let Customers { ada, bayo } = Customers::open(&service).await?;

    service.deposit(ada.id, "10").await?;
    service.withdraw(ada.id, "5").await?;
    service.transfer(ada.id, &bayo.account_number, "1").await?;
    service.deposit(ada.id, "20").await?;

    let history = service.history(ada.id).await?;
    let kinds: Vec<_> = history.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::Transfer,
            TransactionKind::Deposit,
        ]
    );
    assert!(history.windows(2).all(|w| w[0].id < w[1].id));
    assert!(history.iter().all(|r| r.account_id == ada.id));
    Ok(())
}

#[tokio::test]
async fn test_operations_on_unknown_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let ghost = Uuid::new_v4();

    assert!(matches!(
        service.deposit(ghost, "10").await,
        Err(AppError::AccountNotFound(_))
    ));
    assert!(matches!(
        service.withdraw(ghost, "10").await,
        Err(AppError::AccountNotFound(_))
    ));
    assert!(matches!(
        service.balance(ghost).await,
        Err(AppError::AccountNotFound(_))
    ));
    assert!(matches!(
        service.history(ghost).await,
        Err(AppError::AccountNotFound(_))
    ));
    assert_eq!(service.repository().count_transactions().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_balances_never_go_negative() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let Customers { ada, bayo } = Customers::open(&service).await?;
    let cara = common::open_account(&service, "Cara Eze", "cara", "2500").await?;
    let accounts = [ada, bayo, cara];

    let mut expected_total: i64 = 200000 + 200000 + 250000;
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let who = &accounts[rng.gen_range(0..accounts.len())];
        let amount_cents: i64 = rng.gen_range(1..=150000);
        let amount = format!("{}.{:02}", amount_cents / 100, amount_cents % 100);

        match rng.gen_range(0..3) {
            0 => {
                service.deposit(who.id, &amount).await?;
                expected_total += amount_cents;
            }
            1 => match service.withdraw(who.id, &amount).await {
                Ok(_) => expected_total -= amount_cents,
                Err(AppError::InsufficientFunds { .. }) => {}
                Err(e) => return Err(e.into()),
            },
            _ => {
                let to = &accounts[rng.gen_range(0..accounts.len())];
                match service.transfer(who.id, &to.account_number, &amount).await {
                    Ok(_) => {}
                    Err(AppError::InsufficientFunds { .. }) => {}
                    Err(AppError::InvalidRecipient(_)) => assert_eq!(to.id, who.id),
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let mut total = 0;
        for account in &accounts {
            let balance = service.balance(account.id).await?;
            assert!(balance >= 0, "balance went negative: {balance}");
            total += balance;
        }
        assert_eq!(total, expected_total);
    }

    Ok(())
}
