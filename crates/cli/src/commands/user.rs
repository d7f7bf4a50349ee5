//! User management commands.

use shiplane_core::{Email, Phone};
use shiplane_server::db::UserRepository;

use super::CliError;

/// Create a new user.
pub async fn create(email: &str, name: &str, phone: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let phone = Phone::parse(phone).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    if name.trim().is_empty() {
        return Err(CliError::InvalidInput("name cannot be empty".to_string()));
    }

    let pool = super::connect().await?;
    let user = UserRepository::new(&pool).create(&email, name, &phone).await?;

    tracing::info!(id = %user.id, email = %user.email, "user created");
    Ok(())
}
