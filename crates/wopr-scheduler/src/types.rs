//! Trigger definitions (§4.10): cron (5-field, optionally one-shot) and
//! absolute one-shot triggers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SchedulerError, SchedulerResult};

/// A recurring (or once-only) cron trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CronTrigger {
    /// Stable, unique name identifying this trigger.
    pub name: String,
    /// A standard 5-field cron expression (minute hour day-of-month month
    /// day-of-week).
    pub expression: String,
    /// If `true`, this trigger is removed after its first fire.
    pub once: bool,
    /// The session to inject into when this trigger fires.
    pub session: String,
    /// The message payload to inject.
    pub message: Value,
    /// The channel to record against the injection, if any.
    pub channel: Option<String>,
}

/// A one-shot trigger firing once at an absolute time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OneShotTrigger {
    /// Stable, unique name identifying this trigger.
    pub name: String,
    /// Epoch milliseconds at which this trigger should fire.
    pub fire_at_ms: i64,
    /// The session to inject into when this trigger fires.
    pub session: String,
    /// The message payload to inject.
    pub message: Value,
    /// The channel to record against the injection, if any.
    pub channel: Option<String>,
}

/// Either kind of persisted trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// A cron-scheduled trigger.
    Cron(CronTrigger),
    /// An absolute-time, fire-once trigger.
    OneShot(OneShotTrigger),
}

impl Trigger {
    /// This trigger's stable name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Cron(trigger) => &trigger.name,
            Self::OneShot(trigger) => &trigger.name,
        }
    }

    /// The session this trigger injects into.
    #[must_use]
    pub fn session(&self) -> &str {
        match self {
            Self::Cron(trigger) => &trigger.session,
            Self::OneShot(trigger) => &trigger.session,
        }
    }

    /// The message payload this trigger injects.
    #[must_use]
    pub fn message(&self) -> &Value {
        match self {
            Self::Cron(trigger) => &trigger.message,
            Self::OneShot(trigger) => &trigger.message,
        }
    }

    /// The channel this trigger injects under, if any.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::Cron(trigger) => trigger.channel.as_deref(),
            Self::OneShot(trigger) => trigger.channel.as_deref(),
        }
    }
}

/// Parse a standard 5-field cron expression into a [`cron::Schedule`].
///
/// The `cron` crate's own grammar is 6-field (seconds first); a literal
/// `0` seconds field is prepended so callers only ever write the
/// familiar 5-field form.
pub(crate) fn parse_cron_expression(expression: &str) -> SchedulerResult<cron::Schedule> {
    let six_field = format!("0 {expression}");
    cron::Schedule::from_str(&six_field).map_err(|error| SchedulerError::InvalidCronExpression {
        expression: expression.to_string(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cron_expression_accepts_valid_five_field() {
        assert!(parse_cron_expression("0 9 * * *").is_ok());
        assert!(parse_cron_expression("*/15 * * * *").is_ok());
    }

    #[test]
    fn test_parse_cron_expression_rejects_garbage() {
        let err = parse_cron_expression("not a cron expression").unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidCronExpression { .. }));
    }

    #[test]
    fn test_trigger_accessors() {
        let trigger = Trigger::OneShot(OneShotTrigger {
            name: "reminder".to_string(),
            fire_at_ms: 0,
            session: "alice".to_string(),
            message: serde_json::json!("wake up"),
            channel: Some("cli".to_string()),
        });
        assert_eq!(trigger.name(), "reminder");
        assert_eq!(trigger.session(), "alice");
        assert_eq!(trigger.channel(), Some("cli"));
    }
}
