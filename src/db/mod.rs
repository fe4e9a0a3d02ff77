//! Database connections and SQL script execution for the scratch instance.

use anyhow::{Context, Result, anyhow};
use sqlx::PgPool;
use std::time::Duration;
use tracing::debug;

use crate::render::quote_ident;

/// Connect with retry; scratch containers accept TCP connections slightly
/// before the server finishes initializing.
pub async fn connect_with_retry(url: &str) -> Result<PgPool> {
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_millis(200);

    let mut last_error = None;
    for attempt in 0..=MAX_RETRIES {
        match PgPool::connect(url).await {
            Ok(pool) => {
                if attempt > 0 {
                    debug!("Connected to database after {} retries", attempt);
                }
                return Ok(pool);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to connect to database after {} attempts: {}",
        MAX_RETRIES + 1,
        last_error.unwrap()
    ))
}

/// Create a database on the instance the pool points at.
pub async fn create_database(admin_pool: &PgPool, name: &str) -> Result<()> {
    sqlx::query(&format!("CREATE DATABASE {}", quote_ident(name)))
        .execute(admin_pool)
        .await
        .with_context(|| format!("failed to create database {}", name))?;
    Ok(())
}

/// Execute a multi-statement SQL script through the simple query protocol.
pub async fn apply_script(pool: &PgPool, script: &str) -> Result<()> {
    if script.trim().is_empty() {
        return Ok(());
    }
    sqlx::raw_sql(script)
        .execute(pool)
        .await
        .map_err(|e| anyhow!("failed to apply SQL script: {}", e))?;
    Ok(())
}

/// Apply generated statements one at a time so a failure names the statement.
pub async fn apply_statements(pool: &PgPool, statements: &[String]) -> Result<()> {
    for statement in statements {
        sqlx::raw_sql(statement)
            .execute(pool)
            .await
            .with_context(|| format!("failed to apply statement: {}", statement))?;
    }
    Ok(())
}
