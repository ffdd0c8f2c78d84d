//! SQLite-backed implementation of the user and mortgage repositories.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::RepositoryError;
use crate::accounts::{NewUser, User, UserId, UserRepository};
use crate::config::DatabaseConfig;
use crate::mortgages::{Mortgage, MortgageId, MortgageRepository, MortgageTerms};

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
"#;

const CREATE_MORTGAGES: &str = r#"
    CREATE TABLE IF NOT EXISTS mortgages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        credit_score INTEGER NOT NULL,
        loan_amount REAL NOT NULL,
        property_value REAL NOT NULL,
        annual_income REAL NOT NULL,
        debt_amount REAL NOT NULL,
        loan_type TEXT NOT NULL,
        property_type TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id),
        created_at INTEGER NOT NULL
    )
"#;

const CREATE_MORTGAGE_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_mortgages_user_id ON mortgages(user_id)";

const MORTGAGE_COLUMNS: &str = "id, credit_score, loan_amount, property_value, annual_income, \
     debt_amount, loan_type, property_type, user_id, created_at";

/// Pooled SQLite store. Each repository call checks a connection out for one
/// statement and hands it back when the call returns.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Opens (creating if needed) the database named by `config.url` and ensures the tables exist.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!(url = %config.url, "connected to mortgage store");
        Ok(store)
    }

    /// Private in-memory database. The pool is pinned to a single connection that
    /// never idles out, since every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        for statement in [CREATE_USERS, CREATE_MORTGAGES, CREATE_MORTGAGE_OWNER_INDEX] {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        debug!("mortgage store schema ready");
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: UserId(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

fn mortgage_from_row(row: &SqliteRow) -> Result<Mortgage, RepositoryError> {
    let created_at: i64 = row.try_get("created_at")?;
    Ok(Mortgage {
        id: MortgageId(row.try_get("id")?),
        owner: UserId(row.try_get("user_id")?),
        terms: MortgageTerms {
            credit_score: row.try_get("credit_score")?,
            loan_amount: row.try_get("loan_amount")?,
            property_value: row.try_get("property_value")?,
            annual_income: row.try_get("annual_income")?,
            debt_amount: row.try_get("debt_amount")?,
            loan_type: row.try_get("loan_type")?,
            property_type: row.try_get("property_type")?,
        },
        created_at: timestamp_to_datetime(created_at)?,
    })
}

fn timestamp_to_datetime(seconds: i64) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| RepositoryError::Unavailable(format!("invalid timestamp {seconds}")))
}

#[async_trait]
impl UserRepository for SqlStore {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await?;

        Ok(User {
            id: UserId(result.last_insert_rowid()),
            username: user.username,
            password_hash: user.password_hash,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl MortgageRepository for SqlStore {
    async fn insert(&self, owner: UserId, terms: MortgageTerms) -> Result<Mortgage, RepositoryError> {
        let created_at = timestamp_to_datetime(Utc::now().timestamp())?;
        let result = sqlx::query(
            r#"
            INSERT INTO mortgages (credit_score, loan_amount, property_value, annual_income,
                                   debt_amount, loan_type, property_type, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(terms.credit_score)
        .bind(terms.loan_amount)
        .bind(terms.property_value)
        .bind(terms.annual_income)
        .bind(terms.debt_amount)
        .bind(&terms.loan_type)
        .bind(&terms.property_type)
        .bind(owner.0)
        .bind(created_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(Mortgage {
            id: MortgageId(result.last_insert_rowid()),
            owner,
            terms,
            created_at,
        })
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Mortgage>, RepositoryError> {
        let sql = format!("SELECT {MORTGAGE_COLUMNS} FROM mortgages WHERE user_id = ? ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(mortgage_from_row).collect()
    }

    async fn find_owned(
        &self,
        owner: UserId,
        id: MortgageId,
    ) -> Result<Option<Mortgage>, RepositoryError> {
        let sql = format!("SELECT {MORTGAGE_COLUMNS} FROM mortgages WHERE id = ? AND user_id = ?");
        let row = sqlx::query(&sql)
            .bind(id.0)
            .bind(owner.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(mortgage_from_row).transpose()
    }

    async fn update(&self, mortgage: &Mortgage) -> Result<(), RepositoryError> {
        let terms = &mortgage.terms;
        let result = sqlx::query(
            r#"
            UPDATE mortgages
            SET credit_score = ?, loan_amount = ?, property_value = ?, annual_income = ?,
                debt_amount = ?, loan_type = ?, property_type = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(terms.credit_score)
        .bind(terms.loan_amount)
        .bind(terms.property_value)
        .bind(terms.annual_income)
        .bind(terms.debt_amount)
        .bind(&terms.loan_type)
        .bind(&terms.property_type)
        .bind(mortgage.id.0)
        .bind(mortgage.owner.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_owned(&self, owner: UserId, id: MortgageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM mortgages WHERE id = ? AND user_id = ?")
            .bind(id.0)
            .bind(owner.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn average_credit_score(&self) -> Result<Option<f64>, RepositoryError> {
        let average = sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(credit_score) FROM mortgages")
            .fetch_one(&self.pool)
            .await?;
        Ok(average)
    }
}
