//! Decoding of the generic command result the platform returns for create,
//! update and state-transition calls, plus paged list envelopes.
use super::error::{Error, Result};
use super::json::Fields;
use serde::Deserialize;
use serde_json::Value;

/// Which endpoint family a response came from. Drives resource-id
/// precedence and the not-found code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Client,
    Group,
    Office,
    Staff,
}

impl ResourceKind {
    /// Keys checked, in order, for the affected resource's id.
    pub fn id_keys(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Client => &["clientId", "id", "resourceId"],
            _ => &["id", "resourceId"],
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Client => "clients",
            ResourceKind::Group => "groups",
            ResourceKind::Office => "offices",
            ResourceKind::Staff => "staff",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub resource_id: i64,
    pub office_id: Option<i64>,
    pub group_id: Option<i64>,
    pub client_id: Option<i64>,
    pub changes: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandResultBody {
    id: Option<i64>,
    resource_id: Option<i64>,
    office_id: Option<i64>,
    group_id: Option<i64>,
    client_id: Option<i64>,
    changes: Option<Value>,
}

impl CommandResult {
    pub fn from_json(kind: ResourceKind, value: &Value) -> Result<Self> {
        let body = CommandResultBody::deserialize(value).map_err(|e| {
            Error::Decode(format!("unreadable {} command result: {e}", kind.path()))
        })?;
        let resource_id = match kind {
            ResourceKind::Client => body.client_id.or(body.id).or(body.resource_id),
            _ => body.id.or(body.resource_id),
        }
        .ok_or_else(|| {
            Error::Decode(format!(
                "none of {:?} present in {} command result",
                kind.id_keys(),
                kind.path()
            ))
        })?;

        Ok(Self {
            resource_id,
            office_id: body.office_id,
            group_id: body.group_id,
            client_id: body.client_id,
            changes: body.changes,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: Option<i64>,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Accepts a bare array or a `{ "totalFilteredRecords", "pageItems" }`
    /// envelope.
    pub fn from_json(value: &Value, decode: impl Fn(&Value) -> Result<T>) -> Result<Self> {
        let (total, items) = match value {
            Value::Array(items) => (None, items),
            other => {
                let fields = Fields::new(other)?;
                let items = fields.array("pageItems").ok_or_else(|| {
                    Error::Decode("expected an array or a `pageItems` envelope".into())
                })?;
                (fields.i64("totalFilteredRecords"), items)
            }
        };

        let items = items.iter().map(decode).collect::<Result<Vec<T>>>()?;
        Ok(Self { total, items })
    }
}
