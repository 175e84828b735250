//! Schema creation. Every statement is idempotent, so [`create_schema`] runs on each start-up.
use log::debug;
use sqlx::SqliteConnection;

use crate::traits::PaymentStoreError;

const CREATE_PAYMENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id TEXT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        amount INTEGER NOT NULL,
        reference TEXT NOT NULL,
        status TEXT NOT NULL,
        verified INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

// At most one gateway-verified successful payment per reference. A reported payment cannot occupy this slot.
const CREATE_VERIFIED_REFERENCE_INDEX: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS payments_verified_reference
    ON payments (reference) WHERE status = 'success' AND verified = 1;
"#;

// At most one reported successful payment per reference. Failed attempts may repeat.
const CREATE_REPORTED_REFERENCE_INDEX: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS payments_reported_reference
    ON payments (reference) WHERE status = 'success' AND verified = 0;
"#;

const CREATE_FULFILLMENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS fulfillments (
        reference TEXT PRIMARY KEY,
        payment_id INTEGER NOT NULL,
        email TEXT NOT NULL,
        payload TEXT NOT NULL,
        stage TEXT NOT NULL DEFAULT 'verified',
        receipt_path TEXT,
        attempts INTEGER NOT NULL DEFAULT 0,
        last_error TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

pub async fn create_schema(conn: &mut SqliteConnection) -> Result<(), PaymentStoreError> {
    for statement in [
        CREATE_PAYMENTS,
        CREATE_VERIFIED_REFERENCE_INDEX,
        CREATE_REPORTED_REFERENCE_INDEX,
        CREATE_FULFILLMENTS,
    ] {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    debug!("🗃️ Schema is up to date");
    Ok(())
}
