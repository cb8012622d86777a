//! API route definitions

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    self, AnalyzeResponse, AskAiRequest, AskAiResponse, CreatedResponse, ErrorResponse,
    HealthResponse, UpdateResponse,
};
use crate::ai::AdvisorModel;
use crate::store::DocumentStore;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dealdesk API",
        version = "0.1.0",
        description = "Real-estate deal listings, ROI analysis and AI advisory"
    ),
    tags(
        (name = "properties", description = "Property listings"),
        (name = "analysis", description = "ROI and AI analysis"),
        (name = "advisor-requests", description = "Expert review requests"),
        (name = "health", description = "Health checks")
    ),
    paths(
        handlers::health,
        handlers::list_properties,
        handlers::create_property,
        handlers::analyze_property,
        handlers::ask_ai,
        handlers::list_advisor_requests,
        handlers::create_advisor_request,
        handlers::update_advisor_request,
    ),
    components(schemas(
        CreatedResponse,
        AnalyzeResponse,
        AskAiRequest,
        AskAiResponse,
        UpdateResponse,
        HealthResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub model: Arc<dyn AdvisorModel>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let openapi = ApiDoc::openapi();

    Router::new()
        // Properties
        .route("/api/properties", get(handlers::list_properties))
        .route("/api/properties", post(handlers::create_property))

        // Analysis
        .route("/api/analyze-property", post(handlers::analyze_property))
        .route("/api/ask-ai", post(handlers::ask_ai))

        // Advisor requests
        .route("/api/advisor-requests", get(handlers::list_advisor_requests))
        .route("/api/advisor-requests", post(handlers::create_advisor_request))
        .route("/api/advisor-requests/{id}", put(handlers::update_advisor_request))

        // Health
        .route("/health", get(handlers::health))

        // OpenAPI spec and Swagger UI
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", openapi))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
