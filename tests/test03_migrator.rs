mod common;

use std::sync::Arc;

use common::{RecordingPool, open_with};
use gaussdb_dialect::prelude::*;

fn accounts() -> Schema {
    Schema::new(
        "accounts",
        vec![
            Field::new("id", DataType::Uint).size(64).primary_key().auto_increment(),
            Field::new("email", DataType::String).size(255).not_null().unique(),
            Field::new("balance", DataType::Float).precision(12).scale(2).default_value("0"),
            Field::new("created_at", DataType::Time).precision(3),
        ],
    )
    .with_indexes(vec![
        Index::new(&["created_at"]),
        Index::new(&["email", "balance"]).named("uq_email_balance").unique(),
    ])
}

#[test]
fn create_table_then_indexes() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::default());
        let db = open_with(&pool, Config::default()).await?;
        let migrator = db.migrator();
        assert!(migrator.config.create_index_after_create_table);

        migrator.create_table(&accounts()).await?;
        assert_eq!(
            pool.sql(),
            vec![
                "CREATE TABLE \"accounts\" (\"id\" bigserial,\
                 \"email\" varchar(255) NOT NULL UNIQUE,\
                 \"balance\" numeric(12, 2) DEFAULT 0,\
                 \"created_at\" timestamptz(3),\
                 PRIMARY KEY (\"id\"))",
                "CREATE INDEX IF NOT EXISTS \"idx_accounts_created_at\" ON \"accounts\" (\"created_at\")",
                "CREATE UNIQUE INDEX IF NOT EXISTS \"uq_email_balance\" ON \"accounts\" (\"email\",\"balance\")",
            ]
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn alter_column_uses_storage_type_for_serials() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::default());
        let db = open_with(&pool, Config::default()).await?;
        let migrator = db.migrator();
        let schema = accounts();

        migrator.alter_column(&schema, "id").await?;
        migrator.alter_column(&schema, "email").await?;
        assert_eq!(
            pool.sql(),
            vec![
                "ALTER TABLE \"accounts\" ALTER COLUMN \"id\" TYPE bigint",
                "ALTER TABLE \"accounts\" ALTER COLUMN \"email\" TYPE varchar(255)",
            ]
        );

        let err = migrator.alter_column(&schema, "missing").await.unwrap_err();
        assert!(matches!(err, GaussDbError::ExecutionError(_)));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn drop_table_cascades() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::default());
        let db = open_with(&pool, Config::default()).await?;
        db.migrator().drop_table(&accounts()).await?;
        assert_eq!(pool.sql(), vec!["DROP TABLE IF EXISTS \"accounts\" CASCADE"]);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn long_index_names_are_truncated() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::default());
        let db = open_with(&pool, Config::default()).await?;
        let column = "c".repeat(80);
        let schema = Schema::new("t", vec![Field::new(column.clone(), DataType::Int)])
            .with_indexes(vec![Index::new(&[column.as_str()])]);

        let statements = db.migrator().create_table_statements(&schema);
        let expected_name = format!("idx_t_{}", "c".repeat(57));
        assert_eq!(expected_name.len(), 63);
        assert!(statements[1].contains(&format!("\"{expected_name}\"")));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn schema_qualified_tables_quote_each_part() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = Arc::new(RecordingPool::default());
        let db = open_with(&pool, Config::default()).await?;
        let schema = Schema::new("sales.orders", vec![Field::new("id", DataType::Int).size(64).primary_key()])
            .with_indexes(vec![Index::new(&["id"])]);

        let statements = db.migrator().create_table_statements(&schema);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE \"sales\".\"orders\" (\"id\" bigint,PRIMARY KEY (\"id\"))",
                "CREATE INDEX IF NOT EXISTS \"idx_sales_orders_id\" ON \"sales\".\"orders\" (\"id\")",
            ]
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
