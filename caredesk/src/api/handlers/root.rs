//! Unauthenticated index of the API.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Welcome document listing every route group
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiIndex {
    pub message: String,
    pub version: String,
    pub status: String,
    #[schema(value_type = Object)]
    pub endpoints: serde_json::Value,
    pub documentation: String,
    pub note: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    summary = "API index",
    description = "Describes the available endpoints. Does not require authentication.",
    responses(
        (status = 200, description = "Endpoint index", body = ApiIndex),
    )
)]
pub async fn api_root() -> Json<ApiIndex> {
    Json(ApiIndex {
        message: "Welcome to the Caredesk API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "Running".to_string(),
        endpoints: serde_json::json!({
            "authentication": {
                "register": "/api/auth/register/ [POST]",
                "login": "/api/auth/login/ [POST]",
                "refresh": "/api/auth/token/refresh/ [POST]",
            },
            "patients": {
                "list_create": "/api/patients/ [GET, POST]",
                "detail": "/api/patients/<id>/ [GET, PUT, DELETE]",
            },
            "doctors": {
                "list_create": "/api/doctors/ [GET, POST]",
                "detail": "/api/doctors/<id>/ [GET, PUT, DELETE]",
            },
            "mappings": {
                "list_create": "/api/mappings/ [GET, POST]",
                "by_patient": "/api/mappings/<patient_id>/ [GET]",
                "detail": "/api/mappings/detail/<id>/ [GET, DELETE]",
            },
        }),
        documentation: "/docs".to_string(),
        note: "All endpoints except registration, login and token refresh require a bearer access token".to_string(),
    })
}
