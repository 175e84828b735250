use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPaymentRecord, PaymentRecord},
    traits::{InsertPaymentResult, PaymentStoreError},
};

/// Inserts the payment, unless it would duplicate a successful payment.
///
/// Verified and reported records are kept apart. A verified record only conflicts with another verified record, so a
/// reported payment can never stand in for the gateway's confirmation. A reported successful record is refused if
/// any successful record for the reference exists. In both cases the existing record is returned and nothing is
/// written.
pub async fn idempotent_insert(
    record: NewPaymentRecord,
    conn: &mut SqliteConnection,
) -> Result<InsertPaymentResult, PaymentStoreError> {
    let reference = record.reference.clone();
    let verified = record.verified;
    if record.is_success() && !verified {
        if let Some(existing) = fetch_payment_by_reference(&reference, conn).await? {
            debug!("🗃️ Reported payment [{reference}] duplicates payment #{}", existing.id);
            return Ok(InsertPaymentResult::AlreadyExists(existing));
        }
    }
    match insert_payment(record, conn).await {
        Ok(record) => {
            debug!("🗃️ Payment [{}] inserted with id {}", record.reference, record.id);
            Ok(InsertPaymentResult::Inserted(record))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            let existing = fetch_successful(&reference, verified, conn).await?.ok_or_else(|| {
                PaymentStoreError::StorageError(format!("Payment {reference} is a duplicate, but could not be found"))
            })?;
            debug!("🗃️ Payment [{reference}] already exists with id {}", existing.id);
            Ok(InsertPaymentResult::AlreadyExists(existing))
        },
        Err(e) => Err(e.into()),
    }
}

/// Inserts a new payment record. This is not atomic. You can embed this call inside a transaction if you need to
/// ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// The statement is drained with `fetch_all`. Stopping at the first row of a `RETURNING` statement leaves it
/// un-stepped on the pooled connection, and the row stays invisible to other connections until it is reset.
async fn insert_payment(record: NewPaymentRecord, conn: &mut SqliteConnection) -> Result<PaymentRecord, sqlx::Error> {
    let mut rows: Vec<PaymentRecord> = sqlx::query_as(
        r#"
            INSERT INTO payments (student_id, name, email, amount, reference, status, verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(record.student_id)
    .bind(record.name)
    .bind(record.email)
    .bind(record.amount)
    .bind(record.reference)
    .bind(record.status)
    .bind(record.verified)
    .fetch_all(conn)
    .await?;
    rows.pop().ok_or(sqlx::Error::RowNotFound)
}

pub async fn fetch_all_payments(conn: &mut SqliteConnection) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
    let payments: Vec<PaymentRecord> =
        sqlx::query_as("SELECT * FROM payments ORDER BY id DESC").fetch_all(conn).await?;
    trace!("🗃️ Fetched {} payments", payments.len());
    Ok(payments)
}

/// The successful record for `reference`. A gateway-verified record wins over a reported one.
pub async fn fetch_payment_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, PaymentStoreError> {
    let mut rows: Vec<PaymentRecord> = sqlx::query_as(
        r#"
            SELECT * FROM payments
            WHERE reference = $1 AND status = 'success'
            ORDER BY verified DESC, id DESC
            LIMIT 1;
        "#,
    )
    .bind(reference)
    .fetch_all(conn)
    .await?;
    Ok(rows.pop())
}

async fn fetch_successful(
    reference: &str,
    verified: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, PaymentStoreError> {
    let mut rows: Vec<PaymentRecord> = sqlx::query_as(
        "SELECT * FROM payments WHERE reference = $1 AND status = 'success' AND verified = $2 ORDER BY id DESC LIMIT 1",
    )
    .bind(reference)
    .bind(verified)
    .fetch_all(conn)
    .await?;
    Ok(rows.pop())
}
