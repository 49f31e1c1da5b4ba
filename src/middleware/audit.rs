//! Request/response audit logging.
//!
//! Wraps every handler: buffers the request body on entry, invokes the
//! handler, buffers the response body on exit, and appends one
//! [`AuditLogEntry`](crate::models::AuditLogEntry) per request. Requests
//! whose path ends in `/audit-logs` are never logged, since the log browser
//! polling that endpoint would otherwise grow the log geometrically.
//!
//! The tenant id is request-scoped, not process-wide: handlers write it into
//! a [`TenantContext`] (inserted as a request extension before the handler
//! runs) after a successful resolution, and this middleware reads it back
//! only after the handler has returned.

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::routes::AppState;
use crate::store::audit::{insert_audit_log, NewAuditLogEntry};

/// Ceiling on how much of a body is kept in the audit log text. Bodies are
/// still buffered and replayed to the handler in full regardless of size —
/// this only bounds what gets written to the log, never what the handler
/// receives.
const MAX_LOGGED_BODY_BYTES: usize = 1024 * 1024;

/// Hard ceiling on how much of a body this middleware will hold in memory at
/// once. Large enough that no real request triggers it; exists only to bound
/// worst-case memory use, not to shape what handlers see.
const MAX_BUFFERABLE_BODY_BYTES: usize = 64 * 1024 * 1024;

fn truncated_text(bytes: &[u8]) -> String {
    let slice = &bytes[..bytes.len().min(MAX_LOGGED_BODY_BYTES)];
    String::from_utf8_lossy(slice).into_owned()
}

/// Request-scoped slot a handler fills in with the tenant it resolved, so the
/// audit middleware can attribute the log row after the handler completes.
#[derive(Clone, Default)]
pub struct TenantContext(Arc<Mutex<Option<Uuid>>>);

impl TenantContext {
    pub fn set(&self, tenant_id: Uuid) {
        *self.0.lock().unwrap() = Some(tenant_id);
    }

    pub fn get(&self) -> Option<Uuid> {
        *self.0.lock().unwrap()
    }
}

pub async fn audit_log(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if path.ends_with("/audit-logs") {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| path.clone());

    let request_body = if matches!(req.method().as_str(), "GET" | "HEAD") {
        None
    } else {
        match buffer_request_body(&mut req).await {
            Ok(body) => body,
            // The body stream is already half-consumed at this point, so there is
            // no real request left to forward — fail closed rather than hand the
            // handler a silently truncated/empty one.
            Err(response) => return response,
        }
    };

    let ctx = TenantContext::default();
    req.extensions_mut().insert(ctx.clone());

    let response = next.run(req).await;
    let status = response.status();
    let (response, response_body) = buffer_response_body(response).await;

    let tenant_id = ctx.get();

    if let Err(err) = insert_audit_log(
        &state.db,
        NewAuditLogEntry {
            tenant_id,
            method,
            url,
            request_body,
            response_status: status.as_u16() as i32,
            response_body,
        },
    )
    .await
    {
        tracing::error!(error = ?err, "failed to write audit log entry");
    }

    response
}

fn declared_content_length(req: &Request) -> Option<usize> {
    req.headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Buffers the request body so it can be both logged and replayed to the
/// handler. A declared `Content-Length` over the buffering ceiling skips
/// buffering entirely, leaving the original (unconsumed) body stream in
/// place — the body is only ever taken out of `req` once the full byte
/// buffer is already in hand, so the handler always sees the request it was
/// sent, logged or not.
///
/// `to_bytes` failing on an undeclared or malformed body means the stream is
/// already half-read with no way to put it back; rather than forward that as
/// an empty body (corrupting processing) this fails the request outright.
async fn buffer_request_body(req: &mut Request) -> Result<Option<String>, Response> {
    if declared_content_length(req).is_some_and(|len| len > MAX_BUFFERABLE_BODY_BYTES) {
        return Ok(None);
    }

    let body = std::mem::replace(req.body_mut(), Body::empty());
    match to_bytes(body, MAX_BUFFERABLE_BODY_BYTES).await {
        Ok(bytes) => {
            let text = truncated_text(&bytes);
            *req.body_mut() = Body::from(bytes);
            Ok(Some(text))
        }
        Err(err) => {
            tracing::error!(error = ?err, "failed to read request body; failing closed instead of forwarding a corrupted body");
            Err(StatusCode::BAD_REQUEST.into_response())
        }
    }
}

/// Symmetric to [`buffer_request_body`]: every handler response in this
/// service is built from an in-memory `Json`/`Bytes` body well under the
/// buffering ceiling, so this always succeeds in practice. On the residual
/// failure path the original response bytes are already unrecoverable, so
/// this returns a fresh 500 rather than substituting an empty body for what
/// the handler actually produced.
async fn buffer_response_body(response: Response) -> (Response, Option<String>) {
    let (parts, body) = response.into_parts();
    match to_bytes(body, MAX_BUFFERABLE_BODY_BYTES).await {
        Ok(bytes) => {
            let text = truncated_text(&bytes);
            let rebuilt = Response::from_parts(parts, Body::from(bytes));
            (rebuilt, Some(text))
        }
        Err(err) => {
            tracing::error!(error = ?err, "failed to read response body for audit log; body is unrecoverable, failing closed");
            (StatusCode::INTERNAL_SERVER_ERROR.into_response(), None)
        }
    }
}
