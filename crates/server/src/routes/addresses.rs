//! Address book route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use shiplane_core::{AddressId, Phone, Pincode, UserId};

use crate::db::addresses::AddressInput;
use crate::db::{AddressRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::Address;
use crate::state::AppState;

/// Body for creating or updating an address.
#[derive(Debug, Deserialize)]
pub struct AddressBody {
    pub user_id: UserId,
    pub contact_name: String,
    pub contact_phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Query carrying the acting user.
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: UserId,
}

impl AddressBody {
    fn into_input(self) -> Result<(UserId, AddressInput)> {
        let contact_phone = Phone::parse(&self.contact_phone)
            .map_err(|e| AppError::BadRequest(format!("contact_phone: {e}")))?;
        let pincode = Pincode::parse(&self.pincode)
            .map_err(|e| AppError::BadRequest(format!("pincode: {e}")))?;

        if self.contact_name.trim().is_empty() {
            return Err(AppError::BadRequest("contact_name is required".to_string()));
        }
        if self.line1.trim().is_empty() {
            return Err(AppError::BadRequest("line1 is required".to_string()));
        }
        if self.city.trim().is_empty() || self.state.trim().is_empty() {
            return Err(AppError::BadRequest("city and state are required".to_string()));
        }

        Ok((
            self.user_id,
            AddressInput {
                contact_name: self.contact_name,
                contact_phone,
                line1: self.line1,
                line2: self.line2.filter(|l| !l.trim().is_empty()),
                city: self.city,
                state: self.state,
                pincode,
                is_default: self.is_default,
            },
        ))
    }
}

/// List a user's address book.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(params.user_id)
        .await?;
    Ok(Json(addresses))
}

/// Create an address.
#[instrument(skip(state, body), fields(user_id = %body.user_id))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<AddressBody>,
) -> Result<(StatusCode, Json<Address>)> {
    let (user_id, input) = body.into_input()?;

    UserRepository::new(state.pool())
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("unknown user".to_string()))?;

    let address = AddressRepository::new(state.pool())
        .create(user_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Update an address.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressBody>,
) -> Result<Json<Address>> {
    let (user_id, input) = body.into_input()?;

    let address = AddressRepository::new(state.pool())
        .update(id, user_id, &input)
        .await?;
    Ok(Json(address))
}

/// Delete an address.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Query(params): Query<UserParams>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(id, params.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
