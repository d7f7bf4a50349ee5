//! CLI command implementations.

pub mod partner;
pub mod quote;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] shiplane_server::db::RepositoryError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Connect to the server database using the same env vars as the server.
pub(crate) async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SHIPLANE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("SHIPLANE_DATABASE_URL"))?;

    let pool = shiplane_server::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
