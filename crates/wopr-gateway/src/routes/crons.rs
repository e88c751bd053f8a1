//! `/api/crons` — cron and one-shot trigger management (§6, §4.10).

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use wopr_scheduler::{CronTrigger, OneShotTrigger, SchedulerError, Trigger};

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

impl From<SchedulerError> for GatewayError {
    fn from(error: SchedulerError) -> Self {
        match error {
            SchedulerError::NotFound { name } => GatewayError::NotFound(format!("no such trigger: {name}")),
            SchedulerError::InvalidCronExpression { .. } => GatewayError::Validation(error.to_string()),
            SchedulerError::Storage(_) => GatewayError::Internal(anyhow::Error::from(error)),
        }
    }
}

/// `GET /api/crons`
pub async fn list(State(state): State<AppState>) -> GatewayResult<Json<Vec<Trigger>>> {
    Ok(Json(state.scheduler.list_triggers().await?))
}

/// Request body for `POST /api/crons`: either a cron or one-shot
/// trigger, discriminated the same way `Trigger` serializes.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateTriggerRequest {
    /// A recurring (or fire-once) cron trigger.
    Cron {
        /// Stable, unique name identifying this trigger.
        name: String,
        /// A standard 5-field cron expression.
        expression: String,
        /// If `true`, remove this trigger after its first fire.
        #[serde(default)]
        once: bool,
        /// The session to inject into when this trigger fires.
        session: String,
        /// The message payload to inject.
        message: Value,
        /// The channel to record against the injection, if any.
        channel: Option<String>,
    },
    /// An absolute-time trigger.
    OneShot {
        /// Stable, unique name identifying this trigger.
        name: String,
        /// Epoch milliseconds at which this trigger should fire.
        fire_at_ms: i64,
        /// The session to inject into when this trigger fires.
        session: String,
        /// The message payload to inject.
        message: Value,
        /// The channel to record against the injection, if any.
        channel: Option<String>,
    },
}

impl From<CreateTriggerRequest> for Trigger {
    fn from(request: CreateTriggerRequest) -> Self {
        match request {
            CreateTriggerRequest::Cron { name, expression, once, session, message, channel } => {
                Trigger::Cron(CronTrigger { name, expression, once, session, message, channel })
            }
            CreateTriggerRequest::OneShot { name, fire_at_ms, session, message, channel } => {
                Trigger::OneShot(OneShotTrigger { name, fire_at_ms, session, message, channel })
            }
        }
    }
}

/// `POST /api/crons`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTriggerRequest>,
) -> GatewayResult<Json<Trigger>> {
    let trigger: Trigger = body.into();
    state.scheduler.add_trigger(trigger.clone()).await?;
    Ok(Json(trigger))
}

/// `DELETE /api/crons/:name`
pub async fn destroy(State(state): State<AppState>, Path(name): Path<String>) -> GatewayResult<Json<Value>> {
    state.scheduler.remove_trigger(&name).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

/// `GET /api/crons/:name`
pub async fn show(State(state): State<AppState>, Path(name): Path<String>) -> GatewayResult<Json<Trigger>> {
    let triggers = state.scheduler.list_triggers().await?;
    triggers
        .into_iter()
        .find(|trigger| trigger.name() == name)
        .map(Json)
        .ok_or_else(|| GatewayError::NotFound(format!("no such trigger: {name}")))
}
