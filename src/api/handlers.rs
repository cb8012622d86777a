//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::routes::AppState;
use crate::ai::build_prompt;
use crate::analysis::DealInputs;
use crate::error::Error;
use crate::store::{DocumentStore, ADVISOR_REQUESTS, PROPERTIES, USERS};
use crate::types::{AdvisorRequest, Property};

// Request bodies

#[derive(Debug, Deserialize, ToSchema)]
pub struct AskAiRequest {
    /// The property under discussion. Must carry address, price and dealType;
    /// description is optional.
    #[schema(value_type = Object)]
    pub property: Property,
    /// Free-text question about the property
    pub question: Option<String>,
}

// Response types

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    /// Store-generated document identifier
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// ROI as a percentage
    pub roi: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AskAiResponse {
    /// The model's answer, unmodified
    pub response: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Helpers

/// Map a domain error onto the wire: caller mistakes are 400, collaborator
/// failures and everything else are 500. The body is always `{"error": msg}`.
fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = if err.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Resolve a referenced document, degrading silently to an empty object when
/// the reference is absent or dangling. Store failures still propagate.
async fn resolve_reference(
    store: &dyn DocumentStore,
    collection: &str,
    id: Option<&str>,
) -> crate::error::Result<Value> {
    let resolved = match id {
        Some(id) => store.get(collection, id).await?,
        None => None,
    };
    Ok(Value::Object(resolved.unwrap_or_default()))
}

// Handlers

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// List all property listings
#[utoipa::path(
    get,
    path = "/api/properties",
    responses(
        (status = 200, description = "All property documents, store-defined order", body = Vec<Object>),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "properties"
)]
pub async fn list_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, (StatusCode, Json<ErrorResponse>)> {
    let documents = state
        .store
        .list(PROPERTIES)
        .await
        .map_err(error_response)?;

    Ok(Json(documents.into_iter().map(Value::Object).collect()))
}

/// Create a property listing
#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = Object,
    responses(
        (status = 201, description = "Listing created", body = CreatedResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "properties"
)]
pub async fn create_property(
    State(state): State<AppState>,
    Json(property): Json<Property>,
) -> Result<(StatusCode, Json<CreatedResponse>), (StatusCode, Json<ErrorResponse>)> {
    // Persisted as-is; the store embeds the generated id under `id`.
    let id = state
        .store
        .create(PROPERTIES, property.into_document())
        .await
        .map_err(error_response)?;

    tracing::debug!("Created property {}", id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Compute the ROI for a deal
#[utoipa::path(
    post,
    path = "/api/analyze-property",
    request_body = Object,
    responses(
        (status = 200, description = "ROI percentage", body = AnalyzeResponse),
        (status = 400, description = "Missing or non-numeric input", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_property(
    Json(inputs): Json<DealInputs>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let roi = inputs.roi().map_err(error_response)?;
    Ok(Json(AnalyzeResponse { roi }))
}

/// Ask the AI model a question about a property
#[utoipa::path(
    post,
    path = "/api/ask-ai",
    request_body = AskAiRequest,
    responses(
        (status = 200, description = "The model's answer", body = AskAiResponse),
        (status = 400, description = "Property is missing a required field", body = ErrorResponse),
        (status = 500, description = "Model unreachable or errored", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn ask_ai(
    State(state): State<AppState>,
    Json(req): Json<AskAiRequest>,
) -> Result<Json<AskAiResponse>, (StatusCode, Json<ErrorResponse>)> {
    let question = req
        .question
        .as_deref()
        .ok_or_else(|| error_response(Error::InvalidInput("missing field: question".into())))?;

    let prompt = build_prompt(&req.property, question).map_err(error_response)?;

    let response = state
        .model
        .generate(&prompt)
        .await
        .map_err(error_response)?;

    Ok(Json(AskAiResponse { response }))
}

/// List advisor requests with referenced property and user inlined
#[utoipa::path(
    get,
    path = "/api/advisor-requests",
    responses(
        (status = 200, description = "Expanded advisor requests", body = Vec<Object>),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "advisor-requests"
)]
pub async fn list_advisor_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, (StatusCode, Json<ErrorResponse>)> {
    let documents = state
        .store
        .list(ADVISOR_REQUESTS)
        .await
        .map_err(error_response)?;

    let mut expanded = Vec::with_capacity(documents.len());
    for mut doc in documents {
        let property_id = doc
            .get("propertyId")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let user_id = doc.get("userId").and_then(Value::as_str).map(str::to_owned);

        // Dangling references come back as empty objects, not errors.
        let (property, user) = futures::future::try_join(
            resolve_reference(&*state.store, PROPERTIES, property_id.as_deref()),
            resolve_reference(&*state.store, USERS, user_id.as_deref()),
        )
        .await
        .map_err(error_response)?;

        doc.insert("property".to_string(), property);
        doc.insert("user".to_string(), user);
        expanded.push(Value::Object(doc));
    }

    Ok(Json(expanded))
}

/// Create an advisor request
#[utoipa::path(
    post,
    path = "/api/advisor-requests",
    request_body = Object,
    responses(
        (status = 201, description = "Advisor request created", body = CreatedResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "advisor-requests"
)]
pub async fn create_advisor_request(
    State(state): State<AppState>,
    Json(mut request): Json<AdvisorRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), (StatusCode, Json<ErrorResponse>)> {
    // Server owns the lifecycle start: caller-supplied status and createdAt
    // are overwritten.
    request.status = Some("pending".to_string());
    request.created_at = Some(chrono::Utc::now());

    let id = state
        .store
        .create(ADVISOR_REQUESTS, request.into_document())
        .await
        .map_err(error_response)?;

    tracing::debug!("Created advisor request {}", id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Update an advisor request with a partial document
#[utoipa::path(
    put,
    path = "/api/advisor-requests/{id}",
    params(
        ("id" = String, Path, description = "Advisor request identifier")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Fields merged", body = UpdateResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "advisor-requests"
)]
pub async fn update_advisor_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<UpdateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let patch = match patch {
        Value::Object(map) => map,
        _ => {
            return Err(error_response(Error::InvalidInput(
                "expected a JSON object".into(),
            )))
        }
    };

    // No existence pre-check: a nonexistent id surfaces the store's error.
    state
        .store
        .update(ADVISOR_REQUESTS, &id, patch)
        .await
        .map_err(error_response)?;

    Ok(Json(UpdateResponse { success: true }))
}
