//! `SqliteDatabase` is the concrete persistence backend of the fee payment engine.
//!
//! It uses SQLite and implements the [`PaymentStore`] and [`FulfillmentStore`] traits.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, fulfillments, new_pool, payments, schema};
use crate::{
    db_types::{Fulfillment, FulfillmentStage, NewFulfillment, NewPaymentRecord, PaymentRecord},
    traits::{FulfillmentStore, InsertPaymentResult, PaymentStore, PaymentStoreError},
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

impl PaymentStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn initialize(&self) -> Result<(), PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        schema::create_schema(&mut conn).await
    }

    async fn insert_payment(&self, record: NewPaymentRecord) -> Result<InsertPaymentResult, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::idempotent_insert(record, &mut conn).await
    }

    async fn fetch_all_payments(&self) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_all_payments(&mut conn).await
    }

    async fn fetch_payment_by_reference(&self, reference: &str) -> Result<Option<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_by_reference(reference, &mut conn).await
    }
}

impl FulfillmentStore for SqliteDatabase {
    async fn fetch_fulfillment(&self, reference: &str) -> Result<Option<Fulfillment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        fulfillments::fetch_fulfillment(reference, &mut conn).await
    }

    async fn open_fulfillment(&self, fulfillment: NewFulfillment) -> Result<Fulfillment, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        fulfillments::open_fulfillment(fulfillment, &mut conn).await
    }

    async fn advance_fulfillment(
        &self,
        reference: &str,
        stage: FulfillmentStage,
        receipt_path: Option<&str>,
    ) -> Result<Fulfillment, PaymentStoreError> {
        // The stage check and the update must see the same row
        let mut tx = self.pool.begin().await?;
        let fulfillment = fulfillments::advance_fulfillment(reference, stage, receipt_path, &mut tx).await?;
        tx.commit().await?;
        Ok(fulfillment)
    }

    async fn record_fulfillment_failure(&self, reference: &str, error: &str) -> Result<Fulfillment, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        fulfillments::record_failure(reference, error, &mut conn).await
    }

    async fn fetch_stalled_fulfillments(&self, max_attempts: i64) -> Result<Vec<Fulfillment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        fulfillments::fetch_stalled(max_attempts, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `FEE_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, PaymentStoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    /// Connects to the database at `url`, creating the file if it does not exist. Call [`PaymentStore::initialize`]
    /// before using a new database.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentStoreError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
