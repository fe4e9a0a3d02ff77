//! Roundtrip verification: apply the generated DDL to the master state and
//! require semantic equality with the branch catalog.

use anyhow::Result;
use similar::TextDiff;
use sqlx::PgPool;
use tracing::info;

use crate::catalog::Catalog;
use crate::db;

pub struct VerificationReport {
    pub matched: bool,
    /// Residual rendered as a unified diff of canonical catalog descriptions,
    /// plus the per-entity summary lines. Empty when matched.
    pub residual: String,
}

/// Apply `statements` to the master database, re-extract, and compare against
/// the branch catalog.
pub async fn verify_roundtrip(
    master_pool: &PgPool,
    branch_catalog: &Catalog,
    statements: &[String],
) -> Result<VerificationReport> {
    info!("Verifying: applying {} statements", statements.len());
    db::apply_statements(master_pool, statements).await?;

    let migrated = Catalog::load(master_pool).await?;
    if migrated.semantic_eq(branch_catalog) {
        return Ok(VerificationReport {
            matched: true,
            residual: String::new(),
        });
    }

    let summary = migrated.semantic_diff(branch_catalog);
    let migrated_description = migrated.describe();
    let expected_description = branch_catalog.describe();
    let text_diff = TextDiff::from_lines(&migrated_description, &expected_description)
        .unified_diff()
        .header("migrated", "branch")
        .to_string();

    let mut residual = String::new();
    for line in &summary {
        residual.push_str(line);
        residual.push('\n');
    }
    residual.push('\n');
    residual.push_str(&text_diff);

    Ok(VerificationReport {
        matched: false,
        residual,
    })
}
