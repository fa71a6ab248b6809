//! Error codes returned by the controller and the local error taxonomy.

use std::fmt;

/// Broad category of a failure, used by callers to decide how to recover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    Validation,
    NotFound,
    Conflict,
    Transport,
    Protocol,
}

macro_rules! error_codes {
    ($( $variant:ident => $wire:literal, $kind:ident; )*) => {
        /// A server-known `errorCode`, mapped one-to-one from its wire string.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $( $variant, )*
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$( ErrorCode::$variant, )*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( ErrorCode::$variant => $wire, )*
                }
            }

            pub fn kind(self) -> ErrorKind {
                match self {
                    $( ErrorCode::$variant => ErrorKind::$kind, )*
                }
            }

            pub fn from_wire(code: &str) -> Option<Self> {
                match code {
                    $( $wire => Some(ErrorCode::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

error_codes! {
    InvalidCredentials => "invalid_credentials", Authentication;
    SessionExpired => "session_expired", Authentication;
    AuthenticationRequired => "authentication_required", Authentication;
    MfaRequired => "mfa_required", Authentication;
    MfaTokenInvalid => "mfa_token_invalid", Authentication;
    EmailNotVerified => "email_not_verified", Authentication;
    InsufficientPermissions => "insufficient_permissions", Authorization;
    NotOrgAdmin => "not_org_admin", Authorization;
    OrgRequiresOneAdmin => "org_requires_one_admin", Authorization;
    LastUserInResource => "last_user_in_resource", Authorization;
    LastManagerInResource => "last_manager_in_resource", Authorization;
    InvalidInput => "invalid_input", Validation;
    InvalidEndpoint => "invalid_endpoint", Validation;
    InvalidTemplate => "invalid_template", Validation;
    InvitationInvalid => "invitation_invalid", Validation;
    NotFound => "not_found", NotFound;
    EmailExists => "email_exists", Conflict;
    OrgExists => "org_exists", Conflict;
    UserExistsInOrg => "user_exists_in_org", Conflict;
    InvitationExists => "invitation_exists", Conflict;
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {m}"),
        _ => String::new(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid controller url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection refused by {url}")]
    ConnectionRefused { url: String },

    #[error("connection to {url} timed out")]
    ConnectionTimedOut { url: String },

    #[error("request execution failed")]
    RequestFailed(#[source] reqwest::Error),

    #[error("response from {url} is not a controller response (status {status})")]
    NotController {
        url: String,
        status: u16,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("failed to marshal request body")]
    Marshal(#[source] serde_json::Error),

    #[error("failed to unmarshal response data")]
    Unmarshal(#[source] serde_json::Error),

    #[error("controller responded with {code} (status {status}){}", detail(.message))]
    Controller {
        code: ErrorCode,
        status: u16,
        message: Option<String>,
    },

    #[error("controller responded with unknown error code {code:?} (status {status}){}", detail(.message))]
    UnknownErrorCode {
        code: String,
        status: u16,
        message: Option<String>,
    },

    #[error("unsuccessful response (status {status}){}", detail(.message))]
    Unsuccessful { status: u16, message: Option<String> },
}

impl Error {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Controller { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Controller { code, .. } => code.kind(),
            Error::InvalidUrl { .. } => ErrorKind::Validation,
            Error::ConnectionRefused { .. }
            | Error::ConnectionTimedOut { .. }
            | Error::RequestFailed(_)
            | Error::NotController { .. } => ErrorKind::Transport,
            Error::Marshal(_)
            | Error::Unmarshal(_)
            | Error::UnknownErrorCode { .. }
            | Error::Unsuccessful { .. } => ErrorKind::Protocol,
        }
    }

    /// True when the controller answered with a parseable envelope.
    pub fn has_envelope(&self) -> bool {
        matches!(
            self,
            Error::Controller { .. }
                | Error::UnknownErrorCode { .. }
                | Error::Unsuccessful { .. }
                | Error::Unmarshal(_)
        )
    }
}

/// A failed typed operation.
///
/// `partial` holds whatever the envelope's `data` decoded into (zero-valued
/// if nothing usable was sent). It is `None` only when no envelope was parsed
/// at all, i.e. the failure happened at the transport level.
#[derive(Debug)]
pub struct Rejection<T> {
    pub op: &'static str,
    pub error: Error,
    pub partial: Option<T>,
}

impl<T> Rejection<T> {
    pub fn code(&self) -> Option<ErrorCode> {
        self.error.code()
    }

    pub(super) fn transport(op: &'static str, error: Error) -> Self {
        Self {
            op,
            error,
            partial: None,
        }
    }
}

impl<T> fmt::Display for Rejection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op)
    }
}

impl<T: fmt::Debug> std::error::Error for Rejection<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type Outcome<T> = Result<T, Rejection<T>>;

/// Finds the controller error code anywhere in an error chain.
pub fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    find(err).and_then(Error::code)
}

/// Finds the controller error anywhere in an error chain.
pub fn find(err: &anyhow::Error) -> Option<&Error> {
    err.chain().find_map(|cause| cause.downcast_ref::<Error>())
}

#[cfg(test)]
#[path = "../tests/controller/error_tests.rs"]
mod tests;
