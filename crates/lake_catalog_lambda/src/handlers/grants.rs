//! Shares a catalog database and its tables with an external account.
//!
//! Two invocation shapes are accepted. A direct invocation carries the grant
//! request at the top level (plus an optional `RequestType`) and gets a
//! `{statusCode, body}` reply. A stack-lifecycle invocation carries the
//! request under `ResourceProperties.Input`; its outcome is uploaded to the
//! event's `ResponseURL` instead.
//!
//! Failures never escape either shape: direct callers get a non-2xx body,
//! lifecycle callers get a `FAILED` callback. The only error returned is a
//! lifecycle event too malformed to answer.

use lake_catalog_core::custom_resource::{
    is_lifecycle_event, CustomResourceEvent, CustomResourceResponse, ResponseStatus,
};
use lake_catalog_core::grants::{BatchOutcome, GrantMode, GrantRequest};
use lake_catalog_core::validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::adapters::access_control::AccessControl;
use crate::adapters::response_sender::ResponseSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub log_stream_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectInvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error("invalid grant request: {0}")]
    Validation(#[from] ValidationError),
    #[error("malformed lifecycle event: {0}")]
    LifecycleEvent(#[source] serde_json::Error),
    #[error("database permission {mode} failed for {database}: {message}")]
    Database {
        mode: GrantMode,
        database: String,
        message: String,
    },
    #[error("table permission batch {mode} failed for {database}: {message}")]
    Batch {
        mode: GrantMode,
        database: String,
        message: String,
    },
}

pub fn handle_grant_event(
    event: Value,
    context: &InvocationContext,
    access: &impl AccessControl,
    sender: &impl ResponseSender,
) -> Result<Value, GrantError> {
    if is_lifecycle_event(&event) {
        let event: CustomResourceEvent =
            serde_json::from_value(event).map_err(GrantError::LifecycleEvent)?;
        let status = handle_lifecycle_event(&event, context, access, sender);
        Ok(json!({ "Status": status }))
    } else {
        let response = handle_direct_event(&event, access);
        Ok(json!({
            "statusCode": response.status_code,
            "body": response.body,
        }))
    }
}

pub fn handle_direct_event(event: &Value, access: &impl AccessControl) -> DirectInvocationResponse {
    let mode = GrantMode::from_request_type(event.get("RequestType").and_then(Value::as_str));
    info!(%mode, "direct grant invocation");

    let request = match GrantRequest::from_value(event) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "rejecting grant request");
            return error_response(
                400,
                json!({
                    "error": "validation_error",
                    "message": error.to_string(),
                    "fields": error.fields(),
                }),
            );
        }
    };

    match apply_grants(&request, mode, access) {
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(body) => DirectInvocationResponse {
                status_code: 200,
                body,
            },
            Err(error) => error_response(
                500,
                json!({"error": "serialization_error", "message": error.to_string()}),
            ),
        },
        Err(error) => error_response(
            502,
            json!({"error": "access_control_failed", "message": error.to_string()}),
        ),
    }
}

/// Applies the lifecycle request and reports the outcome to `ResponseURL`.
///
/// Returns the status that was reported. A failed upload is logged only;
/// the orchestrator times the resource out on its own.
pub fn handle_lifecycle_event(
    event: &CustomResourceEvent,
    context: &InvocationContext,
    access: &impl AccessControl,
    sender: &impl ResponseSender,
) -> ResponseStatus {
    let request_type = event.request_type.as_deref();
    let mode = GrantMode::from_request_type(request_type);
    info!(
        request_type = request_type.unwrap_or("<missing>"),
        logical_resource_id = %event.logical_resource_id,
        %mode,
        "lifecycle grant invocation"
    );

    let result = event
        .input()
        .map_err(GrantError::from)
        .and_then(|input| GrantRequest::from_value(&input).map_err(GrantError::from))
        .and_then(|request| apply_grants(&request, mode, access));

    let (status, data) = callback_payload(result);

    let response =
        CustomResourceResponse::for_event(event, status, data, &context.log_stream_name, None);
    if let Err(error) = sender.send_response(&event.response_url, &response) {
        error!(%error, request_id = %event.request_id, "failed to deliver lifecycle response");
    }
    status
}

/// Status and `Data` for a lifecycle callback. An outcome that cannot be
/// serialized is reported as a failure rather than an empty success.
fn callback_payload<T: Serialize>(result: Result<T, GrantError>) -> (ResponseStatus, Value) {
    let error = match result.map(serde_json::to_value) {
        Ok(Ok(data)) => return (ResponseStatus::Success, data),
        Ok(Err(error)) => format!("failed to serialize grant outcome: {error}"),
        Err(error) => error.to_string(),
    };
    error!(%error, "catalog grants failed");
    (ResponseStatus::Failed, json!({ "ERROR": error }))
}

/// Grants database `DESCRIBE` then table `ALL` in one batch; revocation runs
/// in the opposite order.
pub fn apply_grants(
    request: &GrantRequest,
    mode: GrantMode,
    access: &impl AccessControl,
) -> Result<BatchOutcome, GrantError> {
    info!(
        %mode,
        account = %request.external_account,
        database = %request.database_name,
        tables = ?request.table_names,
        "applying catalog permissions"
    );

    let database_entry = request.database_entry();
    let table_entries = request.table_entries();
    let database_error = |message: String| GrantError::Database {
        mode,
        database: request.database_name.clone(),
        message,
    };
    let batch_error = |message: String| GrantError::Batch {
        mode,
        database: request.database_name.clone(),
        message,
    };

    let outcome = match mode {
        GrantMode::Grant => {
            access
                .grant_permissions(&database_entry)
                .map_err(database_error)?;
            info!(database = %request.database_name, "database grant completed");
            access
                .batch_grant_permissions(&table_entries)
                .map_err(batch_error)?
        }
        GrantMode::Revoke => {
            let outcome = access
                .batch_revoke_permissions(&table_entries)
                .map_err(batch_error)?;
            access
                .revoke_permissions(&database_entry)
                .map_err(database_error)?;
            info!(database = %request.database_name, "database grant revoked");
            outcome
        }
    };

    for failure in &outcome.failures {
        warn!(
            %mode,
            entry_id = failure.entry_id.as_deref().unwrap_or_default(),
            error_code = failure.error_code.as_deref().unwrap_or_default(),
            error_message = failure.error_message.as_deref().unwrap_or_default(),
            "table permission entry rejected"
        );
    }
    info!(
        %mode,
        entries = table_entries.len(),
        failures = outcome.failures.len(),
        "table permission batch completed"
    );
    Ok(outcome)
}

fn error_response(status_code: u16, payload: Value) -> DirectInvocationResponse {
    DirectInvocationResponse {
        status_code,
        body: payload.to_string(),
    }
}
