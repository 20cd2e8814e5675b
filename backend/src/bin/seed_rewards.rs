//! Install the default reward catalog into PostgreSQL.
//!
//! Titles already present are left alone, so reruns are harmless.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::Write;

use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use kabadiyo::domain::default_catalog;
use kabadiyo::domain::ports::LedgerRepository;
use kabadiyo::outbound::persistence::{
    DbPool, DieselLedgerRepository, PoolConfig, run_pending_migrations,
};
use tokio::runtime::Builder;

/// `seed-rewards` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-rewards",
    about = "Seed the Kabadiyo reward catalog",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Skip applying pending migrations first.
    #[arg(long = "skip-migrations")]
    skip_migrations: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(CliArgs::parse()))
}

async fn async_main(args: CliArgs) -> color_eyre::Result<()> {
    let database_url = resolve_database_url(args.database_url, env::var("DATABASE_URL").ok())?;

    if !args.skip_migrations {
        run_pending_migrations(&database_url)
            .await
            .wrap_err("apply migrations")?;
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;
    let repository = DieselLedgerRepository::new(pool);
    let catalog = default_catalog();
    let inserted = repository
        .seed_rewards(&catalog)
        .await
        .wrap_err("seed reward catalog")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "inserted={inserted}")?;
    writeln!(stdout, "skipped={}", catalog.len().saturating_sub(inserted))?;
    Ok(())
}

fn resolve_database_url(
    explicit: Option<String>,
    from_env: Option<String>,
) -> color_eyre::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(eyre!("--database-url must not be empty when provided"));
        }
        return Ok(value);
    }

    match from_env {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(eyre!("DATABASE_URL must not be empty")),
        None => Err(eyre!(
            "database URL missing: set --database-url or DATABASE_URL"
        )),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI helpers.

    use rstest::rstest;

    use super::resolve_database_url;

    #[rstest]
    #[case(Some("postgres://a"), Some("postgres://b"), "postgres://a")]
    #[case(None, Some("postgres://b"), "postgres://b")]
    fn explicit_url_wins_over_environment(
        #[case] explicit: Option<&str>,
        #[case] from_env: Option<&str>,
        #[case] expected: &str,
    ) {
        let url = resolve_database_url(explicit.map(str::to_owned), from_env.map(str::to_owned))
            .expect("url resolves");
        assert_eq!(url, expected);
    }

    #[rstest]
    #[case(Some(" "), None, "must not be empty")]
    #[case(None, Some(""), "DATABASE_URL must not be empty")]
    #[case(None, None, "database URL missing")]
    fn blank_or_missing_urls_are_rejected(
        #[case] explicit: Option<&str>,
        #[case] from_env: Option<&str>,
        #[case] message: &str,
    ) {
        let error =
            resolve_database_url(explicit.map(str::to_owned), from_env.map(str::to_owned))
                .expect_err("url should be rejected");
        assert!(error.to_string().contains(message));
    }
}
