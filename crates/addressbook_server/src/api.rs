//! Contact route table.
//!
//! # Responsibility
//! - Map HTTP verbs and paths to contact service calls.
//! - Bind path ids and JSON bodies, rejecting malformed input before any
//!   store access.
//!
//! # Invariants
//! - Handlers carry no business rules; they adapt wire shapes only.
//! - All routes live under `/api/addressbook/v1`.

use crate::error::{ApiError, ApiResult};
use crate::middleware;
use crate::state::AppState;
use addressbook_core::{
    parse_contact_input, parse_contact_patch, Contact, ContactId, SchemaViolation,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::ACCESS_CONTROL_ALLOW_METHODS;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub const API_PREFIX: &str = "/api/addressbook/v1";
const CONTACTS_PATH: &str = "/api/addressbook/v1/contacts";
const CONTACT_PATH: &str = "/api/addressbook/v1/contacts/{id}";

const COLLECTION_ALLOWED_METHODS: &str = "GET";
const ITEM_ALLOWED_METHODS: &str = "GET,POST,PATCH,DELETE";

/// Builds the complete application: contact routes and the error middleware,
/// bound to `state`.
pub fn build_app(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            CONTACTS_PATH,
            get(list_contacts)
                .post(create_contact)
                .options(collection_options),
        )
        .route(
            CONTACT_PATH,
            get(get_contact)
                .patch(update_contact)
                .delete(delete_contact)
                .options(item_options),
        )
        .with_state(state);

    middleware::install(routes)
}

async fn collection_options() -> impl IntoResponse {
    (
        [(ACCESS_CONTROL_ALLOW_METHODS, COLLECTION_ALLOWED_METHODS)],
        Json(json!({})),
    )
}

async fn item_options() -> impl IntoResponse {
    (
        [(ACCESS_CONTROL_ALLOW_METHODS, ITEM_ALLOWED_METHODS)],
        Json(json!({})),
    )
}

async fn list_contacts(State(state): State<AppState>) -> ApiResult<Json<Vec<Contact>>> {
    let contacts = state.with_service(|service| service.list_contacts()).await?;
    Ok(Json(contacts))
}

async fn get_contact(
    State(state): State<AppState>,
    id: Result<Path<ContactId>, PathRejection>,
) -> ApiResult<Json<Contact>> {
    let id = contact_id(id)?;
    let contact = state
        .with_service(move |service| service.get_contact(id))
        .await?;
    Ok(Json(contact))
}

async fn create_contact(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let input = parse_contact_input(&json_body(body)?)?;
    let contact = state
        .with_service(move |service| service.create_contact(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn update_contact(
    State(state): State<AppState>,
    id: Result<Path<ContactId>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Contact>> {
    let id = contact_id(id)?;
    let patch = parse_contact_patch(&json_body(body)?)?;
    let contact = state
        .with_service(move |service| service.update_contact(id, &patch))
        .await?;
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<AppState>,
    id: Result<Path<ContactId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = contact_id(id)?;
    state
        .with_service(move |service| service.delete_contact(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn contact_id(path: Result<Path<ContactId>, PathRejection>) -> ApiResult<ContactId> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(PathRejection::FailedToDeserializePathParams(_)) => {
            Err(ApiError::Validation(vec![SchemaViolation {
                loc: vec!["path".to_string(), "id".to_string()],
                message: "Input should be a valid integer".to_string(),
                kind: "int_parsing",
            }]))
        }
        Err(other) => Err(ApiError::Internal(format!("path binding failed: {other}"))),
    }
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(rejection)) => Err(ApiError::BadBody {
            status: rejection.status(),
            kind: "content_type_invalid",
            message: rejection.body_text(),
        }),
        Err(JsonRejection::JsonSyntaxError(rejection)) => Err(ApiError::BadBody {
            status: rejection.status(),
            kind: "json_invalid",
            message: rejection.body_text(),
        }),
        Err(other) => Err(ApiError::BadBody {
            status: other.status(),
            kind: "body_invalid",
            message: other.body_text(),
        }),
    }
}
