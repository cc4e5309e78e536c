use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::server::rest::error::{ApiError, ApiResult};
use crate::server::rest::middleware::Caller;
use crate::shared::models::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StateResponse {
    /// Runtime status word, e.g. `running` or `exited`.
    pub state: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsoleResponse {
    pub console: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RunCommandRequest {
    pub cmd: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutputResponse {
    pub output: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnvResponse {
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    /// Catalog id of the game to provision.
    pub service: String,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: String,
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> ApiResult<Json<StateResponse>> {
    let status = state.controller.state().await?;
    Ok(Json(StateResponse { state: status }))
}

pub async fn get_console(State(state): State<Arc<AppState>>) -> ApiResult<Json<ConsoleResponse>> {
    let console = state.controller.console().await?;
    Ok(Json(ConsoleResponse { console }))
}

pub async fn run_command(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunCommandRequest>,
) -> ApiResult<Json<OutputResponse>> {
    if req.cmd.trim().is_empty() {
        return Err(ApiError::BadRequest("cmd must not be empty".to_string()));
    }

    let output = state.controller.run_command(&req.cmd).await?;
    Ok(Json(OutputResponse { output }))
}

pub async fn get_env(State(state): State<Arc<AppState>>) -> ApiResult<Json<EnvResponse>> {
    let values = state.controller.env().await?.into_iter().collect();
    Ok(Json(EnvResponse { values }))
}

pub async fn start_service(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.controller.start().await?;
    Ok(StatusCode::OK)
}

pub async fn stop_service(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.controller.stop().await?;
    Ok(StatusCode::OK)
}

pub async fn create_service(
    Extension(caller): Extension<Caller>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateServiceRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    info!("User {} creating service {}", caller.user_id, req.service);

    let id = state.controller.create_service(&req.service, &req.env).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn remove_service(
    Extension(caller): Extension<Caller>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    info!("User {} removing service container", caller.user_id);

    state.controller.delete().await?;
    Ok(StatusCode::OK)
}

/// Dry run of the config a create would launch with.
pub async fn validate_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateServiceRequest>,
) -> ApiResult<Json<EnvResponse>> {
    let config = state.controller.validate_config(&req.service, &req.env)?;
    Ok(Json(EnvResponse {
        values: config.into_iter().collect(),
    }))
}
