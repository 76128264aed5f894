//! Finish enrollments whose payment was recorded but whose follow-up writes
//! never completed.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use clap::Parser;
use course_commerce::domain::EnrollmentCoordinator;
use course_commerce::domain::ports::EnrollmentCommand;
use course_commerce::outbound::document_store::{PostgresDocumentStore, StoreConfig};
use mockable::DefaultClock;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `reconcile-enrollments` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reconcile-enrollments",
    about = "Repair enrollments left pending after a partial failure",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Exit with a failure status when any transaction could not be repaired.
    #[arg(long = "strict")]
    strict: bool,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;
    let store = PostgresDocumentStore::connect(&StoreConfig::new(database_url))
        .await
        .map_err(|error| io::Error::other(format!("connect document store: {error}")))?;

    let coordinator = EnrollmentCoordinator::new(Arc::new(store), Arc::new(DefaultClock));
    let report = coordinator
        .reconcile_pending()
        .await
        .map_err(|error| io::Error::other(format!("reconciliation failed: {error}")))?;

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|error| io::Error::other(format!("render report: {error}")))?;
    println!("{rendered}");

    if args.strict && !report.failed.is_empty() {
        return Err(io::Error::other(format!(
            "{} transaction(s) still pending",
            report.failed.len()
        )));
    }
    Ok(())
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;

    #[test]
    fn explicit_url_wins() {
        let url = resolve_database_url(Some("postgres://db/courses".to_owned()))
            .expect("explicit url");
        assert_eq!(url, "postgres://db/courses");
    }

    #[test]
    fn rejects_empty_explicit_url() {
        let error = resolve_database_url(Some("   ".to_owned())).expect_err("empty should fail");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn falls_back_to_environment() {
        let _guard = lock_env([("DATABASE_URL", Some("postgres://env/courses".to_owned()))]);
        let url = resolve_database_url(None).expect("env url");
        assert_eq!(url, "postgres://env/courses");
    }

    #[test]
    fn missing_url_is_invalid_input() {
        let _guard = lock_env([("DATABASE_URL", None::<String>)]);
        let error = resolve_database_url(None).expect_err("missing should fail");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}
