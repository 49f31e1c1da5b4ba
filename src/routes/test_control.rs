use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::Result;
use crate::handlers::test_control as h;
use crate::models::{CreateAuthCodeRequest, CreateTenantRequest};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tenants", post(create_tenant).get(list_tenants))
        .route("/tenants/{id}", get(get_tenant).delete(delete_tenant))
        .route("/{id}/reset", post(reset_tenant))
        .route("/{id}/auth-code", post(create_auth_code))
        .route("/{id}/messages/{channel_id}", get(get_messages))
        .route("/{id}/reactions", get(get_reactions))
        .route(
            "/{id}/interaction-responses/{token}",
            get(get_interaction_response),
        )
        .route("/{id}/followups/{token}", get(get_followups))
        .route("/{id}/commands/{guild_id}", get(get_commands))
        .route("/{id}/audit-logs", get(get_audit_logs))
        .route("/{id}/interactions/send", post(send_interaction))
}

fn parse_tenant_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| crate::error::AppError::TenantNotFound)
}

async fn create_tenant(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let req: CreateTenantRequest = h::parse_json_body(&headers, &body)?;
    let tenant = h::create_tenant(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(tenant).unwrap())))
}

async fn list_tenants(State(state): State<AppState>) -> Result<Json<Value>> {
    let tenants = h::list_tenants(&state.db).await?;
    Ok(Json(json!(tenants)))
}

async fn get_tenant(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let tenant = h::get_tenant(&state.db, id).await?;
    Ok(Json(serde_json::to_value(tenant).unwrap()))
}

async fn delete_tenant(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_tenant_id(&id)?;
    h::delete_tenant(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reset_tenant(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    h::reset_tenant(&state.db, id).await?;
    Ok(Json(json!({ "reset": true })))
}

async fn create_auth_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let req: CreateAuthCodeRequest = h::parse_json_body(&headers, &body)?;
    let response = h::create_auth_code(&state.db, id, req).await?;
    Ok(Json(serde_json::to_value(response).unwrap()))
}

async fn get_messages(
    State(state): State<AppState>,
    Path((id, channel_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let messages = h::get_messages(&state.db, id, &channel_id).await?;
    Ok(Json(json!(messages)))
}

async fn get_reactions(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let reactions = h::get_reactions(&state.db, id).await?;
    Ok(Json(json!(reactions)))
}

async fn get_interaction_response(
    State(state): State<AppState>,
    Path((id, token)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let response = h::get_interaction_response(&state.db, id, &token).await?;
    Ok(Json(json!(response)))
}

async fn get_followups(
    State(state): State<AppState>,
    Path((id, token)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let followups = h::get_followups(&state.db, id, &token).await?;
    Ok(Json(json!(followups)))
}

async fn get_commands(
    State(state): State<AppState>,
    Path((id, guild_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let commands = h::get_commands(&state.db, id, &guild_id).await?;
    Ok(Json(json!(commands)))
}

async fn get_audit_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<h::AuditLogQuery>,
) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let page = h::get_audit_logs(&state.db, id, query).await?;
    Ok(Json(serde_json::to_value(page).unwrap()))
}

async fn send_interaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let id = parse_tenant_id(&id)?;
    let req: h::SendInteractionRequest = h::parse_json_body(&headers, &body)?;
    let response = h::send_interaction(&state.db, &state.http, id, req).await?;
    Ok(Json(serde_json::to_value(response).unwrap()))
}
