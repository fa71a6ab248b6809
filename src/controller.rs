//! Blocking client for the controller's JSON envelope API.

use std::fmt::Debug;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;

mod error;
pub use self::error::{Error, ErrorCode, ErrorKind, Outcome, Rejection, error_code, find};

mod types;
pub use self::types::*;

mod audit;
pub use self::audit::Order;
mod orgs;
mod session;
mod templates;
mod tokens;

pub const API_PREFIX: &str = "/api/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Placeholder body type for requests without a payload.
pub const NO_BODY: Option<&()> = None;

#[derive(Clone, Debug)]
pub enum Auth {
    None,
    Bearer(String),
    Basic { username: String, password: String },
}

#[derive(serde::Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default, rename = "errorCode")]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct Client {
    base: String,
    user_agent: String,
    auth: Auth,
    http: HttpClient,
}

impl Client {
    pub fn new(controller_url: &str, id: &str, auth: Auth) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidUrl {
            url: controller_url.to_string(),
            reason: reason.to_string(),
        };
        let parsed = reqwest::Url::parse(controller_url).map_err(|e| invalid(&e.to_string()))?;
        if parsed.scheme().is_empty() {
            return Err(invalid("missing scheme"));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }

        let user_agent = format!(
            "opsicle/controller-sdk/client-{} v{}",
            id,
            env!("CARGO_PKG_VERSION")
        );
        let http = HttpClient::builder()
            .user_agent(user_agent.clone())
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(Error::RequestFailed)?;

        Ok(Self {
            base: controller_url.trim_end_matches('/').to_string(),
            user_agent,
            auth,
            http,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base, API_PREFIX, path)
    }

    /// Performs one request and decodes the envelope's `data` into `T`.
    pub fn call<B, T>(&self, op: &'static str, method: Method, path: &str, body: Option<&B>) -> Outcome<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default + Debug,
    {
        self.call_with_query(op, method, path, &[], body)
    }

    pub fn call_with_query<B, T>(
        &self,
        op: &'static str,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Outcome<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default + Debug,
    {
        let url = self.url(path);
        let payload = match body {
            Some(b) => Some(
                serde_json::to_vec(b).map_err(|e| Rejection::transport(op, Error::Marshal(e)))?,
            ),
            None => None,
        };

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        req = match &self.auth {
            Auth::None => req,
            Auth::Bearer(token) => req.bearer_auth(token),
            Auth::Basic { username, password } => req.basic_auth(username, Some(password)),
        };
        if let Some(payload) = payload {
            req = req.body(payload);
        }

        tracing::debug!(op, %method, %url, "controller request");
        let resp = req
            .send()
            .map_err(|e| Rejection::transport(op, classify(&self.base, e)))?;
        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .map_err(|e| Rejection::transport(op, Error::RequestFailed(e)))?;
        tracing::debug!(op, status, bytes = bytes.len(), "controller response");

        decode_envelope(op, &self.base, status, &bytes)
    }
}

pub(crate) fn decode_envelope<T>(op: &'static str, base: &str, status: u16, bytes: &[u8]) -> Outcome<T>
where
    T: DeserializeOwned + Default + Debug,
{
    let not_controller = |source| {
        Rejection::transport(
            op,
            Error::NotController {
                url: base.to_string(),
                status,
                source,
            },
        )
    };
    if status > 500 {
        return Err(not_controller(None));
    }
    let envelope: RawEnvelope =
        serde_json::from_slice(bytes).map_err(|e| not_controller(Some(e)))?;

    let decoded: Result<T, serde_json::Error> = if envelope.data.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(envelope.data)
    };

    if status == 200 && envelope.success {
        return decoded.map_err(|e| Rejection {
            op,
            error: Error::Unmarshal(e),
            partial: Some(T::default()),
        });
    }

    let partial = decoded.unwrap_or_default();
    let error = match envelope.error_code {
        Some(code) => match ErrorCode::from_wire(&code) {
            Some(code) => Error::Controller {
                code,
                status,
                message: envelope.message,
            },
            None => Error::UnknownErrorCode {
                code,
                status,
                message: envelope.message,
            },
        },
        None => Error::Unsuccessful {
            status,
            message: envelope.message,
        },
    };
    tracing::debug!(op, status, error = %error, "controller rejected request");
    Err(Rejection {
        op,
        error,
        partial: Some(partial),
    })
}

fn classify(base: &str, err: reqwest::Error) -> Error {
    let url = base.to_string();
    if err.is_timeout() {
        return Error::ConnectionTimedOut { url };
    }
    if err.is_connect() {
        let mut cause: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(&err);
        while let Some(c) = cause {
            if let Some(io) = c.downcast_ref::<std::io::Error>() {
                match io.kind() {
                    std::io::ErrorKind::ConnectionRefused => {
                        return Error::ConnectionRefused { url };
                    }
                    std::io::ErrorKind::TimedOut => return Error::ConnectionTimedOut { url },
                    _ => {}
                }
            }
            cause = c.source();
        }
    }
    Error::RequestFailed(err)
}

/// Percent-encodes one path segment.
pub(crate) fn segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'@' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/controller/envelope_tests.rs"]
mod tests;
