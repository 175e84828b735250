use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Fulfillment, FulfillmentStage, NewFulfillment},
    traits::PaymentStoreError,
};

pub async fn fetch_fulfillment(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Fulfillment>, PaymentStoreError> {
    let mut rows: Vec<Fulfillment> =
        sqlx::query_as("SELECT * FROM fulfillments WHERE reference = $1").bind(reference).fetch_all(conn).await?;
    Ok(rows.pop())
}

/// Inserts the fulfillment unless one exists for the reference, and returns whatever is stored.
pub async fn open_fulfillment(
    fulfillment: NewFulfillment,
    conn: &mut SqliteConnection,
) -> Result<Fulfillment, PaymentStoreError> {
    let payload = serde_json::to_string(&fulfillment.payload)?;
    let result = sqlx::query(
        r#"
            INSERT INTO fulfillments (reference, payment_id, email, payload, stage)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (reference) DO NOTHING;
        "#,
    )
    .bind(&fulfillment.reference)
    .bind(fulfillment.payment_id)
    .bind(&fulfillment.email)
    .bind(payload)
    .bind(FulfillmentStage::Verified)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        debug!("🗃️ Opened fulfillment for [{}]", fulfillment.reference);
    }
    fetch_fulfillment(&fulfillment.reference, conn)
        .await?
        .ok_or_else(|| PaymentStoreError::FulfillmentNotFound(fulfillment.reference.clone()))
}

pub async fn advance_fulfillment(
    reference: &str,
    stage: FulfillmentStage,
    receipt_path: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Fulfillment, PaymentStoreError> {
    let current =
        fetch_fulfillment(reference, conn).await?.ok_or_else(|| PaymentStoreError::FulfillmentNotFound(reference.into()))?;
    if stage < current.stage {
        return Err(PaymentStoreError::StageRegression {
            reference: reference.to_string(),
            from: current.stage.to_string(),
            to: stage.to_string(),
        });
    }
    // Drained with fetch_all so that the update is stepped to completion before the connection is released
    let mut rows: Vec<Fulfillment> = sqlx::query_as(
        r#"
            UPDATE fulfillments SET
                stage = $1,
                receipt_path = COALESCE($2, receipt_path),
                last_error = NULL,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $3
            RETURNING *;
        "#,
    )
    .bind(stage)
    .bind(receipt_path)
    .bind(reference)
    .fetch_all(conn)
    .await?;
    let fulfillment = rows.pop().ok_or_else(|| PaymentStoreError::FulfillmentNotFound(reference.into()))?;
    debug!("🗃️ Fulfillment [{reference}] is now {stage}");
    Ok(fulfillment)
}

pub async fn record_failure(
    reference: &str,
    error: &str,
    conn: &mut SqliteConnection,
) -> Result<Fulfillment, PaymentStoreError> {
    let mut rows: Vec<Fulfillment> = sqlx::query_as(
        r#"
            UPDATE fulfillments SET
                attempts = attempts + 1,
                last_error = $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $2
            RETURNING *;
        "#,
    )
    .bind(error)
    .bind(reference)
    .fetch_all(conn)
    .await?;
    let fulfillment = rows.pop().ok_or_else(|| PaymentStoreError::FulfillmentNotFound(reference.into()))?;
    debug!("🗃️ Fulfillment [{reference}] failed {} time(s). {error}", fulfillment.attempts);
    Ok(fulfillment)
}

pub async fn fetch_stalled(max_attempts: i64, conn: &mut SqliteConnection) -> Result<Vec<Fulfillment>, PaymentStoreError> {
    let stalled: Vec<Fulfillment> = sqlx::query_as(
        r#"
            SELECT * FROM fulfillments
            WHERE stage != $1 AND attempts < $2
            ORDER BY created_at ASC, reference ASC;
        "#,
    )
    .bind(FulfillmentStage::Notified)
    .bind(max_attempts)
    .fetch_all(conn)
    .await?;
    trace!("🗃️ {} stalled fulfillments", stalled.len());
    Ok(stalled)
}
