use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which upstream endpoint produced a ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketOrigin {
    #[default]
    Active,
    Archived,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub display_name: Option<String>,
}

/// A helpdesk ticket as returned by the active or archived ticket endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ticket_number: Option<String>,
    pub status: Option<String>,
    pub subject: Option<String>,
    pub created_time: Option<String>,
    pub closed_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub assignee: Option<Assignee>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department_id: Option<String>,
    pub department_name: Option<String>,
    #[serde(default)]
    pub origin: TicketOrigin,
}

impl Ticket {
    /// Assignee display name, preferring the nested assignee object.
    pub fn assignee_display_name(&self) -> Option<&str> {
        self.assignee
            .as_ref()
            .and_then(|a| non_empty(&a.display_name))
            .or_else(|| non_empty(&self.assignee_name))
    }

    /// Assignee id, preferring the flat field.
    pub fn assignee_identifier(&self) -> Option<&str> {
        non_empty(&self.assignee_id)
            .or_else(|| self.assignee.as_ref().and_then(|a| non_empty(&a.id)))
    }

    pub fn with_origin(mut self, origin: TicketOrigin) -> Self {
        self.origin = origin;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingEntry {
    pub status: Option<String>,
    pub handled_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandledEntry {
    pub agent_name: Option<String>,
    pub handling_time: Option<String>,
}

/// Per-ticket measurements from the metrics endpoint.
///
/// Agent, status, department and created time are denormalized copies and may
/// disagree with the ticket they belong to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ticket_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub first_response_time: Option<String>,
    pub resolution_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub thread_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub response_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub outgoing_count: Option<u64>,
    pub agent_name: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department_id: Option<String>,
    pub department_name: Option<String>,
    pub created_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reopen_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reassign_count: Option<u64>,
    #[serde(default)]
    pub staging_data: Vec<StagingEntry>,
    #[serde(default)]
    pub agents_handled: Vec<HandledEntry>,
}

impl MetricRow {
    /// `threadCount`, falling back to `responseCount`, else zero.
    pub fn effective_thread_count(&self) -> u64 {
        self.thread_count
            .filter(|c| *c > 0)
            .or(self.response_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    #[serde(deserialize_with = "required_lenient_string")]
    pub id: String,
    pub name: String,
}

/// Bearer token handed out by the upstream auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns the string when present and not blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_string))
}

fn required_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string(value).ok_or_else(|| serde::de::Error::custom("expected string or number id"))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(float_count)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().and_then(float_count),
        _ => None,
    };
    Ok(count)
}

fn float_count(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then(|| f as u64)
}
