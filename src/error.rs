/// Closed set of error codes surfaced to callers. Each carries a fixed
/// numeric code and a static message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotConnected,
    InvalidAuthToken,
    Unauthenticated,
    InvalidArgument,
    InvalidDate,
    DecodeError,
    ResourceValidation,
    ClientNotFound,
    GroupNotFound,
    OfficeNotFound,
    StaffNotFound,
    Unknown,
}

impl ErrorCode {
    pub fn code(self) -> u16 {
        match self {
            ErrorCode::NotConnected => 1,
            ErrorCode::InvalidAuthToken => 2,
            ErrorCode::Unauthenticated => 3,
            ErrorCode::InvalidArgument => 10,
            ErrorCode::InvalidDate => 11,
            ErrorCode::DecodeError => 12,
            ErrorCode::ResourceValidation => 20,
            ErrorCode::ClientNotFound => 100,
            ErrorCode::GroupNotFound => 101,
            ErrorCode::OfficeNotFound => 102,
            ErrorCode::StaffNotFound => 103,
            ErrorCode::Unknown => 999,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::NotConnected => "Not connected to the server",
            ErrorCode::InvalidAuthToken => "Invalid or expired authentication token",
            ErrorCode::Unauthenticated => "Invalid username or password",
            ErrorCode::InvalidArgument => "Invalid argument",
            ErrorCode::InvalidDate => "Invalid date",
            ErrorCode::DecodeError => "Server response is missing required fields",
            ErrorCode::ResourceValidation => "The server rejected the request",
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::GroupNotFound => "Group not found",
            ErrorCode::OfficeNotFound => "Office not found",
            ErrorCode::StaffNotFound => "Staff not found",
            ErrorCode::Unknown => "Unknown error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Could not decode server response: {0}")]
    Decode(String),
    #[error("{0}")]
    Api(ErrorCode),
    #[error("Validation failed: {message}")]
    ResourceValidation { message: String },
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::InvalidDate(_) => ErrorCode::InvalidDate,
            Error::Decode(_) => ErrorCode::DecodeError,
            Error::Api(code) => *code,
            Error::ResourceValidation { .. } => ErrorCode::ResourceValidation,
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        Error::InvalidArgument(format!("{field} is not set"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
