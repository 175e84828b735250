use std::path::PathBuf;

use log::*;
use tempfile::TempDir;

use crate::{traits::PaymentStore, SqliteDatabase};

/// A freshly initialised database and a scratch directory for receipts. Both disappear when this is dropped.
pub struct TestEnv {
    pub db: SqliteDatabase,
    pub dir: TempDir,
}

impl TestEnv {
    pub fn receipt_dir(&self) -> PathBuf {
        self.dir.path().join("receipts")
    }
}

pub async fn prepare_test_env() -> TestEnv {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().expect("Error creating temporary directory");
    let url = format!("sqlite://{}", dir.path().join("fee_payments.db").display());
    let db = create_database(&url).await;
    TestEnv { db, dir }
}

pub async fn create_database(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.initialize().await.expect("Error creating the schema");
    info!("🗃️ Created Sqlite database {url}");
    db
}
