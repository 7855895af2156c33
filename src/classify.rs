//! Maps a failed transport outcome onto the crate's error taxonomy.
use super::error::{Error, ErrorCode};
use super::resource::ResourceKind;
use serde::Deserialize;

/// The call site a failure came from. Login and resource calls report
/// 401 differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Authentication,
    Resource(ResourceKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// No HTTP response was obtained at all.
    NoResponse(String),
    /// A response arrived but its body was not the expected JSON.
    MalformedBody(String),
    /// A non-success HTTP status.
    Status { status: u16, body: String },
}

/// First match wins: connectivity, malformed body, then status code.
pub fn classify(endpoint: Endpoint, failure: &Failure) -> Error {
    match failure {
        Failure::NoResponse(reason) => {
            tracing::debug!(%reason, "no response from server");
            Error::Api(ErrorCode::NotConnected)
        }
        Failure::MalformedBody(reason) => {
            tracing::debug!(%reason, "unreadable response body");
            Error::Api(ErrorCode::InvalidAuthToken)
        }
        Failure::Status { status: 401, .. } => match endpoint {
            Endpoint::Authentication => Error::Api(ErrorCode::Unauthenticated),
            Endpoint::Resource(_) => Error::Api(ErrorCode::InvalidAuthToken),
        },
        Failure::Status { status: 403, body } => match developer_message(body) {
            Some(message) => Error::ResourceValidation { message },
            None => {
                tracing::error!(%body, "403 response without a developerMessage");
                Error::Decode(format!("403 response without a developerMessage: {body}"))
            }
        },
        Failure::Status { status: 404, .. } => match endpoint {
            Endpoint::Resource(kind) => Error::Api(not_found(kind)),
            Endpoint::Authentication => Error::Api(ErrorCode::Unknown),
        },
        Failure::Status { status, .. } => {
            tracing::warn!(status, ?endpoint, "unclassified response status");
            Error::Api(ErrorCode::Unknown)
        }
    }
}

pub fn not_found(kind: ResourceKind) -> ErrorCode {
    match kind {
        ResourceKind::Client => ErrorCode::ClientNotFound,
        ResourceKind::Group => ErrorCode::GroupNotFound,
        ResourceKind::Office => ErrorCode::OfficeNotFound,
        ResourceKind::Staff => ErrorCode::StaffNotFound,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    developer_message: Option<String>,
    errors: Option<Vec<ErrorDetail>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    developer_message: Option<String>,
}

/// `developerMessage` at the top level, else from the first `errors[]`
/// entry that has one.
pub fn developer_message(body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;
    body.developer_message
        .or_else(|| body.errors?.into_iter().find_map(|e| e.developer_message))
}
