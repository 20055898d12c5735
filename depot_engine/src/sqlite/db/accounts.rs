use depot_common::Gold;
use sqlx::SqliteConnection;

use crate::{db_types::LedgerAccount, traits::LedgerError};

/// Inserts a zero-balance account for `identity` unless one already exists.
pub(crate) async fn create_if_missing(identity: &str, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    sqlx::query("INSERT INTO accounts (identity) VALUES ($1) ON CONFLICT(identity) DO NOTHING")
        .bind(identity)
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) async fn fetch_or_create_balance(identity: &str, conn: &mut SqliteConnection) -> Result<Gold, LedgerError> {
    create_if_missing(identity, &mut *conn).await?;
    let balance: Gold = sqlx::query_scalar("SELECT balance FROM accounts WHERE identity = $1")
        .bind(identity)
        .fetch_one(conn)
        .await?;
    Ok(balance)
}

pub(crate) async fn fetch_account(
    identity: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerAccount>, LedgerError> {
    let account = sqlx::query_as("SELECT identity, balance, created_at, updated_at FROM accounts WHERE identity = $1")
        .bind(identity)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

/// Adds `delta` to the balance of `identity` in a single statement, creating the account if needed.
pub(crate) async fn adjust_balance(
    identity: &str,
    delta: Gold,
    conn: &mut SqliteConnection,
) -> Result<Gold, LedgerError> {
    let balance: Gold = sqlx::query_scalar(
        r#"
    INSERT INTO accounts (identity, balance) VALUES ($1, $2)
    ON CONFLICT(identity) DO UPDATE SET balance = balance + excluded.balance, updated_at = CURRENT_TIMESTAMP
    RETURNING balance
    "#,
    )
    .bind(identity)
    .bind(delta)
    .fetch_one(conn)
    .await?;
    Ok(balance)
}

/// Subtracts `amount` from the balance of `identity` only if the balance covers it. Returns `None` when it does not
/// (or when the account does not exist).
pub(crate) async fn debit_if_sufficient(
    identity: &str,
    amount: Gold,
    conn: &mut SqliteConnection,
) -> Result<Option<Gold>, LedgerError> {
    let balance: Option<Gold> = sqlx::query_scalar(
        r#"
    UPDATE accounts SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP
    WHERE identity = $2 AND balance >= $3
    RETURNING balance
    "#,
    )
    .bind(amount)
    .bind(identity)
    .bind(amount)
    .fetch_optional(conn)
    .await?;
    Ok(balance)
}
