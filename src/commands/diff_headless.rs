//! `diff-headless`: build master and branch schema states in a disposable
//! container, diff them, emit ordered DDL, and optionally verify the result.

use anyhow::{Context, Result, bail};
use console::style;
use std::fs;
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::db;
use crate::diff;
use crate::docker::DockerManager;
use crate::render::{self, Safety};
use crate::verify;

const MASTER_DATABASE: &str = "pgdelta_master";
const BRANCH_DATABASE: &str = "pgdelta_branch";

#[derive(clap::Args, Debug)]
pub struct DiffHeadlessArgs {
    /// SQL applied to both sides before the master/branch scripts
    #[arg(long)]
    pub initial_sql: Option<PathBuf>,

    /// SQL script defining the current (master) state
    #[arg(long)]
    pub master_sql: PathBuf,

    /// SQL script defining the desired (branch) state
    #[arg(long)]
    pub branch_sql: PathBuf,

    /// Docker image for the scratch PostgreSQL instance
    #[arg(long, default_value = "postgres:17")]
    pub postgres_image: String,

    /// Write the generated statements to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Apply the generated DDL to the master state and require the result to
    /// match the branch (default)
    #[arg(long, overrides_with = "no_verify")]
    pub verify: bool,

    /// Skip roundtrip verification
    #[arg(long)]
    pub no_verify: bool,
}

pub async fn run(args: DiffHeadlessArgs) -> Result<()> {
    // Read the inputs before any container work so bad paths fail fast.
    let initial_script = match &args.initial_sql {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => String::new(),
    };
    let master_script = fs::read_to_string(&args.master_sql)
        .with_context(|| format!("failed to read {}", args.master_sql.display()))?;
    let branch_script = fs::read_to_string(&args.branch_sql)
        .with_context(|| format!("failed to read {}", args.branch_sql.display()))?;

    let manager = DockerManager::new().await?;
    let scratch = manager
        .start_scratch_postgres(&args.postgres_image)
        .await?;

    let admin_pool = db::connect_with_retry(&scratch.info.connection_string("postgres")).await?;
    db::create_database(&admin_pool, MASTER_DATABASE).await?;
    db::create_database(&admin_pool, BRANCH_DATABASE).await?;
    admin_pool.close().await;

    let master_pool =
        db::connect_with_retry(&scratch.info.connection_string(MASTER_DATABASE)).await?;
    db::apply_script(&master_pool, &initial_script)
        .await
        .context("while applying --initial-sql to the master state")?;
    db::apply_script(&master_pool, &master_script)
        .await
        .context("while applying --master-sql")?;

    let branch_pool =
        db::connect_with_retry(&scratch.info.connection_string(BRANCH_DATABASE)).await?;
    db::apply_script(&branch_pool, &initial_script)
        .await
        .context("while applying --initial-sql to the branch state")?;
    db::apply_script(&branch_pool, &branch_script)
        .await
        .context("while applying --branch-sql")?;

    let source = Catalog::load(&master_pool).await?;
    let target = Catalog::load(&branch_pool).await?;
    branch_pool.close().await;

    let changes = diff::diff(&source, &target)?;
    let rendered = render::emit_all(&changes);
    let statements: Vec<String> = rendered.iter().map(|r| r.sql.clone()).collect();
    let destructive = rendered
        .iter()
        .filter(|r| r.safety == Safety::Destructive)
        .count();

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", statements.join("\n\n")))
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{} wrote {} statements to {}",
                style("✓").green(),
                statements.len(),
                path.display()
            );
        }
        None => {
            for statement in &statements {
                println!("{}\n", statement);
            }
        }
    }
    if destructive > 0 {
        eprintln!(
            "{} {} destructive statement(s)",
            style("!").yellow(),
            destructive
        );
    }

    let verify_enabled = args.verify || !args.no_verify;
    if verify_enabled {
        let report = verify::verify_roundtrip(&master_pool, &target, &statements).await?;
        master_pool.close().await;
        if !report.matched {
            eprintln!("{}", report.residual);
            bail!("verification failed: migrated schema differs from the branch schema");
        }
        eprintln!(
            "{} verified: migrated schema matches the branch schema",
            style("✓").green()
        );
    } else {
        master_pool.close().await;
    }

    drop(scratch);
    Ok(())
}
