use depot_common::Gold;
use sqlx::SqliteConnection;

use crate::traits::LedgerError;

pub(crate) async fn fetch_reserve_balance(conn: &mut SqliteConnection) -> Result<Gold, LedgerError> {
    let balance: Option<Gold> =
        sqlx::query_scalar("SELECT balance FROM reserve WHERE id = 1").fetch_optional(conn).await?;
    Ok(balance.unwrap_or_default())
}

pub(crate) async fn credit_reserve(amount: Gold, conn: &mut SqliteConnection) -> Result<Gold, LedgerError> {
    let balance: Gold = sqlx::query_scalar(
        r#"
    INSERT INTO reserve (id, balance) VALUES (1, $1)
    ON CONFLICT(id) DO UPDATE SET balance = balance + excluded.balance, updated_at = CURRENT_TIMESTAMP
    RETURNING balance
    "#,
    )
    .bind(amount)
    .fetch_one(conn)
    .await?;
    Ok(balance)
}

/// Subtracts `amount` from the reserve only if the reserve covers it. Returns `None` when it does not.
pub(crate) async fn debit_reserve_if_sufficient(
    amount: Gold,
    conn: &mut SqliteConnection,
) -> Result<Option<Gold>, LedgerError> {
    let balance: Option<Gold> = sqlx::query_scalar(
        r#"
    UPDATE reserve SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP
    WHERE id = 1 AND balance >= $2
    RETURNING balance
    "#,
    )
    .bind(amount)
    .bind(amount)
    .fetch_optional(conn)
    .await?;
    Ok(balance)
}
