//! `SqliteDatabase` is a concrete implementation of a depot ledger backend.
//!
//! Every balance change is either a single `UPDATE .. RETURNING` / upsert statement, or a transaction whose first
//! statement is a write. SQLite therefore takes the write lock before any balance is read, and concurrent
//! read-modify-write sequences cannot lose updates.
use std::fmt::Debug;

use depot_common::Gold;
use log::*;
use sqlx::SqlitePool;

use super::db::{accounts, db_url, new_pool, reserve};
use crate::{
    db_types::LedgerAccount,
    traits::{LedgerError, LedgerManagement, RESERVE_ACCOUNT},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn fetch_balance(&self, identity: &str) -> Result<Gold, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        accounts::fetch_or_create_balance(identity, &mut conn).await
    }

    async fn fetch_account(&self, identity: &str) -> Result<Option<LedgerAccount>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        accounts::fetch_account(identity, &mut conn).await
    }

    async fn fetch_reserve_balance(&self) -> Result<Gold, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        reserve::fetch_reserve_balance(&mut conn).await
    }

    async fn adjust_balance(&self, identity: &str, delta: Gold) -> Result<Gold, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let balance = accounts::adjust_balance(identity, delta, &mut conn).await?;
        trace!("🏦️ Adjusted {identity} by {delta}. New balance: {balance}");
        Ok(balance)
    }

    async fn transfer(&self, from: &str, to: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError> {
        let mut tx = self.pool.begin().await?;
        accounts::create_if_missing(from, &mut tx).await?;
        let from_balance = match accounts::debit_if_sufficient(from, amount, &mut tx).await? {
            Some(balance) => balance,
            None => {
                let available = accounts::fetch_or_create_balance(from, &mut tx).await?;
                tx.rollback().await?;
                debug!("🏦️ Transfer of {amount} from {from} to {to} rejected. {from} only has {available}");
                return Err(LedgerError::InsufficientFunds { account: from.to_string(), available, requested: amount });
            },
        };
        let to_balance = accounts::adjust_balance(to, amount, &mut tx).await?;
        tx.commit().await?;
        trace!("🏦️ Transferred {amount} from {from} to {to}");
        // A transfer to oneself debits and credits the same row; the credit carries the final value.
        let from_balance = if from == to { to_balance } else { from_balance };
        Ok((from_balance, to_balance))
    }

    async fn reserve_transfer(&self, identity: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError> {
        let mut tx = self.pool.begin().await?;
        accounts::create_if_missing(identity, &mut tx).await?;
        let balances = if amount.is_positive() {
            match reserve::debit_reserve_if_sufficient(amount, &mut tx).await? {
                Some(reserve_balance) => {
                    let balance = accounts::adjust_balance(identity, amount, &mut tx).await?;
                    Ok((balance, reserve_balance))
                },
                None => {
                    let available = reserve::fetch_reserve_balance(&mut tx).await?;
                    Err(LedgerError::InsufficientFunds {
                        account: RESERVE_ACCOUNT.to_string(),
                        available,
                        requested: amount,
                    })
                },
            }
        } else if amount.is_negative() {
            let debit = amount.abs();
            match accounts::debit_if_sufficient(identity, debit, &mut tx).await? {
                Some(balance) => {
                    let reserve_balance = reserve::credit_reserve(debit, &mut tx).await?;
                    Ok((balance, reserve_balance))
                },
                None => {
                    let available = accounts::fetch_or_create_balance(identity, &mut tx).await?;
                    Err(LedgerError::InsufficientFunds {
                        account: identity.to_string(),
                        available,
                        requested: debit,
                    })
                },
            }
        } else {
            let balance = accounts::fetch_or_create_balance(identity, &mut tx).await?;
            let reserve_balance = reserve::fetch_reserve_balance(&mut tx).await?;
            Ok((balance, reserve_balance))
        };
        match balances {
            Ok(b) => {
                tx.commit().await?;
                trace!("🏦️ Reserve transfer of {amount} for {identity} complete");
                Ok(b)
            },
            Err(e) => {
                tx.rollback().await?;
                debug!("🏦️ Reserve transfer of {amount} for {identity} rejected. {e}");
                Err(e)
            },
        }
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the `DEPOT_DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, LedgerError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    /// Creates a new database API object with the given URL. The database file is created if it does not exist.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, LedgerError> {
        trace!("Creating new database connection pool for {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn run_migrations(&self) -> Result<(), LedgerError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;
        info!("🏦️ Ledger migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}
