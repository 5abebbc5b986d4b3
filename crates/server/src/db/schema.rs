//! Table creation.
//!
//! There is no migration history: [`initialize`] issues `IF NOT EXISTS`
//! statements, so running it against an existing database is a no-op and it
//! never alters a table that is already there.
//!
//! Delete behaviour is carried by the foreign keys:
//! - deleting a user deletes their orders (and so those orders' links)
//! - deleting an order deletes its links
//! - deleting a product removes it from every order

use sqlx::PgPool;
use tracing::{info, instrument};

use super::RepositoryError;

/// Statements run by [`initialize`], in dependency order.
pub const STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(120) NOT NULL,
        email VARCHAR(254) NOT NULL,
        address VARCHAR(255),
        CONSTRAINT users_email_key UNIQUE (email)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS products (
        id SERIAL PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        price NUMERIC(12, 2) NOT NULL,
        description TEXT,
        CONSTRAINT products_price_positive CHECK (price > 0)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS orders (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        order_date TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS orders_user_id_order_date_idx
        ON orders (user_id, order_date DESC)
    ",
    r"
    CREATE TABLE IF NOT EXISTS order_products (
        order_id INTEGER NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        product_id INTEGER NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
        PRIMARY KEY (order_id, product_id)
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS order_products_product_id_idx
        ON order_products (product_id)
    ",
];

/// Create every table and index that does not exist yet.
///
/// All statements run in one transaction, so a failure leaves the database
/// as it was.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails.
#[instrument(skip(pool))]
pub async fn initialize(pool: &PgPool) -> Result<(), RepositoryError> {
    let mut tx = pool.begin().await?;

    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    info!(statements = STATEMENTS.len(), "Database tables initialized");
    Ok(())
}
