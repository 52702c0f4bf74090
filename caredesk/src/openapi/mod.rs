//! OpenAPI documentation for the `/api/*` surface.
//!
//! [`ApiDoc`] collects the `utoipa` annotations on every handler. It is served as JSON at
//! `/api/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{api, validation::FieldErrors};

/// Bearer access tokens issued by `/auth/login/` and `/auth/register/`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token authentication. Include the `access` token from login or registration \
                            in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_ACCESS_TOKEN\n```\n\n\
                            Exchange a refresh token at `/auth/token/refresh/` once the access token expires.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caredesk API",
        description = "Patient records, a shared doctor directory and doctor assignments."
    ),
    servers(
        (url = "/api", description = "Caredesk API server")
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::root::api_root,
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::refresh,
        api::handlers::doctors::list_doctors,
        api::handlers::doctors::create_doctor,
        api::handlers::doctors::get_doctor,
        api::handlers::doctors::update_doctor,
        api::handlers::doctors::delete_doctor,
        api::handlers::patients::list_patients,
        api::handlers::patients::create_patient,
        api::handlers::patients::get_patient,
        api::handlers::patients::update_patient,
        api::handlers::patients::delete_patient,
        api::handlers::mappings::list_mappings,
        api::handlers::mappings::create_mapping,
        api::handlers::mappings::list_patient_mappings,
        api::handlers::mappings::get_mapping,
        api::handlers::mappings::delete_mapping,
    ),
    components(
        schemas(
            FieldErrors,
            api::handlers::root::ApiIndex,
            api::models::MessageResponse,
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::RefreshRequest,
            api::models::auth::TokenPair,
            api::models::auth::AuthResponse,
            api::models::auth::AccessTokenResponse,
            api::models::users::UserResponse,
            api::models::doctors::Specialization,
            api::models::doctors::DoctorCreate,
            api::models::doctors::DoctorUpdate,
            api::models::doctors::DoctorResponse,
            api::models::doctors::DoctorMutationResponse,
            api::models::patients::Gender,
            api::models::patients::PatientCreate,
            api::models::patients::PatientUpdate,
            api::models::patients::PatientResponse,
            api::models::patients::PatientMutationResponse,
            api::models::mappings::MappingCreate,
            api::models::mappings::MappingListResponse,
            api::models::mappings::MappingDetailResponse,
            api::models::mappings::PatientMappingsResponse,
            api::models::mappings::MappingCreatedResponse,
        )
    ),
    tags(
        (name = "meta", description = "Service information."),
        (name = "authentication", description = "Account registration, login and token refresh. No token required."),
        (name = "doctors", description = "The doctor directory. Shared by every authenticated user."),
        (name = "patients", description = "Patient records. Each user only ever sees the patients they created; \
            anything else answers 404."),
        (name = "mappings", description = "Doctor assignments. A doctor can be assigned to one of your patients once; \
            assignments cannot be edited, only removed."),
    )
)]
pub struct ApiDoc;
