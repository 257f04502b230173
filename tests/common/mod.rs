#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gaussdb_dialect::prelude::*;

/// Pool stand-in that records every statement and can be told to fail.
#[derive(Default)]
pub struct RecordingPool {
    pub statements: Mutex<Vec<(String, Vec<RowValues>)>>,
    pub fail_with: Option<String>,
}

impl RecordingPool {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

#[async_trait]
impl ConnPool for RecordingPool {
    async fn exec(&self, sql: &str, vars: &[RowValues]) -> Result<u64, GaussDbError> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), vars.to_vec()));
        match &self.fail_with {
            Some(message) => Err(GaussDbError::ExecutionError(message.clone())),
            None => Ok(0),
        }
    }
}

pub async fn open_with(pool: &Arc<RecordingPool>, config: Config) -> Result<Db, GaussDbError> {
    let conn: Arc<dyn ConnPool> = pool.clone();
    Db::open(GaussDialect::new(config.with_conn(conn)), OrmConfig::default()).await
}
