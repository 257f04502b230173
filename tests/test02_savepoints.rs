mod common;

use std::sync::Arc;

use common::{RecordingPool, open_with};
use gaussdb_dialect::prelude::*;

#[test]
fn savepoint_and_rollback_statements() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::default());
        let db = open_with(&pool, Config::default()).await?;

        db.savepoint("sp1").await?;
        db.rollback_to("sp1").await?;

        assert_eq!(pool.sql(), vec!["SAVEPOINT sp1", "ROLLBACK TO SAVEPOINT sp1"]);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn savepoint_errors_are_returned() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::failing("no transaction in progress"));
        let db = open_with(&pool, Config::default()).await?;

        let err = db.savepoint("sp1").await.unwrap_err();
        assert!(matches!(err, GaussDbError::ExecutionError(ref m) if m.contains("no transaction")));
        assert!(db.rollback_to("sp1").await.is_err());
        assert_eq!(pool.sql().len(), 2);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn exec_without_pool_fails() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::default());
        let mut db = open_with(&pool, Config::default()).await?;
        db.conn_pool = None;

        let err = db.savepoint("sp1").await.unwrap_err();
        assert!(matches!(err, GaussDbError::ConnectionError(_)));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
