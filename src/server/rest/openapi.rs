use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::billing::{AccountingPhase, LedgerSnapshot};
use crate::server::rest::{
    error::{ErrorDetails, ErrorResponse},
    handlers::service::{
        ConsoleResponse, CreateServiceRequest, CreatedResponse, EnvResponse, OutputResponse, RunCommandRequest,
        StateResponse,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::server::rest::openapi::health,
        crate::server::rest::openapi::get_cycles,
        crate::server::rest::openapi::get_state,
        crate::server::rest::openapi::get_console,
        crate::server::rest::openapi::run_command,
        crate::server::rest::openapi::get_env,
        crate::server::rest::openapi::start_service,
        crate::server::rest::openapi::stop_service,
        crate::server::rest::openapi::create_service,
        crate::server::rest::openapi::remove_service,
        crate::server::rest::openapi::validate_config,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorDetails,
            StateResponse,
            ConsoleResponse,
            RunCommandRequest,
            OutputResponse,
            EnvResponse,
            CreateServiceRequest,
            CreatedResponse,
            LedgerSnapshot,
            AccountingPhase,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Billing", description = "Uptime metering"),
        (name = "Service", description = "Game server container management"),
    ),
    info(
        title = "Gamehost Agent API",
        version = "1.0.0",
        description = "Per-instance game server agent",
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Id"))),
            );
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Agent is up"),
    ),
)]
#[allow(dead_code)]
pub async fn health() {}

#[utoipa::path(
    get,
    path = "/cycles",
    tag = "Billing",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Granted and burned cycles", body = LedgerSnapshot),
        (status = 401, description = "Caller is not the owner", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn get_cycles() {}

#[utoipa::path(
    get,
    path = "/state",
    tag = "Service",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Container status", body = StateResponse),
        (status = 404, description = "No container", body = ErrorResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn get_state() {}

#[utoipa::path(
    get,
    path = "/console",
    tag = "Service",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Console lines", body = ConsoleResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn get_console() {}

#[utoipa::path(
    post,
    path = "/run",
    tag = "Service",
    request_body = RunCommandRequest,
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Command output", body = OutputResponse),
        (status = 400, description = "Game does not accept commands", body = ErrorResponse),
        (status = 409, description = "No strategy bound", body = ErrorResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn run_command() {}

#[utoipa::path(
    get,
    path = "/env",
    tag = "Service",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Declared env of the live container", body = EnvResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn get_env() {}

#[utoipa::path(
    post,
    path = "/start",
    tag = "Service",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Started"),
        (status = 404, description = "No container", body = ErrorResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn start_service() {}

#[utoipa::path(
    post,
    path = "/stop",
    tag = "Service",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Stopped"),
        (status = 404, description = "No container", body = ErrorResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn stop_service() {}

#[utoipa::path(
    post,
    path = "/create",
    tag = "Service",
    request_body = CreateServiceRequest,
    security(("user_id" = [])),
    responses(
        (status = 201, description = "Container provisioned", body = CreatedResponse),
        (status = 400, description = "Config rejected", body = ErrorResponse),
        (status = 404, description = "Unknown service", body = ErrorResponse),
        (status = 409, description = "A container already exists", body = ErrorResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn create_service() {}

#[utoipa::path(
    delete,
    path = "/remove",
    tag = "Service",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Container removed, volumes kept"),
        (status = 404, description = "No container", body = ErrorResponse),
        (status = 503, description = "Runtime unavailable", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn remove_service() {}

#[utoipa::path(
    post,
    path = "/validate",
    tag = "Service",
    request_body = CreateServiceRequest,
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Config a create would launch with", body = EnvResponse),
        (status = 400, description = "Config rejected", body = ErrorResponse),
        (status = 404, description = "Unknown service", body = ErrorResponse),
    ),
)]
#[allow(dead_code)]
pub async fn validate_config() {}
