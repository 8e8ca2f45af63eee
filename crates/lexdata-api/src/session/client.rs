// Action API session
//
// Wraps `reqwest::Client` with the MediaWiki action API conventions:
// `format=json` on everything, CSRF substitution and `assertuser` on
// writes, and the `maxlag` backoff protocol. Login and construction live
// in `login.rs`; this module is the transport mechanics.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{AuthMode, HttpAuth};
use crate::error::Error;
use crate::params::{AUTO_TOKEN, Params};
use crate::transport::TransportConfig;

/// Public Wikidata action API endpoint.
pub const WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Backoff behaviour for the server's `maxlag` signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxlagPolicy {
    /// `maxlag` sent with every write.
    pub maxlag: u32,
    /// `maxlag` sent with the login request.
    pub login_maxlag: u32,
    /// Retries per call before giving up. `None` means retry forever.
    pub max_retries: Option<u32>,
    /// Delay used when the response carries no `Retry-After` header.
    pub default_retry_after: Duration,
}

impl Default for MaxlagPolicy {
    fn default() -> Self {
        Self {
            maxlag: 5,
            login_maxlag: 30,
            max_retries: None,
            default_retry_after: Duration::from_secs(5),
        }
    }
}

/// The `error` member of a response, read leniently: a well-formed error
/// is `{"code": "...", "info": "..."}`, but any value counts as a failure.
struct ApiError {
    code: String,
    info: String,
    lag: Option<f64>,
}

impl ApiError {
    fn from_value(err: &Value) -> Self {
        let text = |v: &Value| v.as_str().map_or_else(|| v.to_string(), str::to_owned);
        match err {
            Value::String(code) => Self {
                code: code.clone(),
                info: String::new(),
                lag: None,
            },
            _ => Self {
                code: err.get("code").map(text).unwrap_or_default(),
                info: err.get("info").map_or_else(|| err.to_string(), text),
                lag: err.get("lag").and_then(Value::as_f64),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

enum Outcome {
    Done(Value),
    Lagged {
        retry_after: Duration,
        lag: Option<f64>,
    },
}

/// Authenticated connection to one action API endpoint.
///
/// Every call is a full request/response round trip. The only recovery
/// performed is waiting out `maxlag` errors; everything else is returned
/// to the caller. A session is meant to be driven by one logical task at
/// a time; wrap it in an `Arc` to share it.
pub struct Session {
    pub(crate) http: reqwest::Client,
    pub(crate) api_url: Url,
    /// CSRF token for writes. Set by login or supplied by the caller, never
    /// refreshed: a stale token makes writes fail with `badtoken`.
    pub(crate) csrf_token: RwLock<Option<SecretString>>,
    /// Current `maxlag` threshold; raised only while logging in.
    pub(crate) maxlag: AtomicU32,
    pub(crate) assert_user: Option<String>,
    pub(crate) http_auth: Option<HttpAuth>,
    pub(crate) policy: MaxlagPolicy,
    pub(crate) auth_mode: AuthMode,
    maxlag_retries: AtomicU64,
}

impl Session {
    /// Anonymous session with the default transport.
    pub fn anonymous(api_url: Url) -> Result<Self, Error> {
        let http = TransportConfig::default().build_client()?;
        Ok(Self::with_client(http, api_url))
    }

    /// Anonymous session around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, api_url: Url) -> Self {
        Self::from_parts(http, api_url, MaxlagPolicy::default(), None)
    }

    pub(crate) fn from_parts(
        http: reqwest::Client,
        api_url: Url,
        policy: MaxlagPolicy,
        http_auth: Option<HttpAuth>,
    ) -> Self {
        Self {
            http,
            api_url,
            csrf_token: RwLock::new(None),
            maxlag: AtomicU32::new(policy.maxlag),
            assert_user: None,
            http_auth,
            policy,
            auth_mode: AuthMode::Anonymous,
            maxlag_retries: AtomicU64::new(0),
        }
    }

    /// The action API endpoint this session talks to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Account name sent as `assertuser` on writes, if any.
    pub fn assert_user(&self) -> Option<&str> {
        self.assert_user.as_deref()
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn policy(&self) -> &MaxlagPolicy {
        &self.policy
    }

    /// The `maxlag` value the next write will carry.
    pub fn maxlag(&self) -> u32 {
        self.maxlag.load(Ordering::Relaxed)
    }

    pub fn has_csrf_token(&self) -> bool {
        self.csrf_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// Number of maxlag backoffs performed over the session's lifetime.
    pub fn maxlag_retries(&self) -> u64 {
        self.maxlag_retries.load(Ordering::Relaxed)
    }

    // ── CSRF token management ─────────────────────────────────────────

    pub(crate) fn set_csrf_token(&self, token: SecretString) {
        debug!("storing CSRF token");
        *self
            .csrf_token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token);
    }

    fn current_csrf_token(&self) -> Option<SecretString> {
        self.csrf_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    // ── Request entry points ─────────────────────────────────────────

    /// Send a GET request and return the parsed JSON body.
    ///
    /// API errors other than `maxlag` fail with [`Error::Request`].
    pub async fn get(&self, params: &Params) -> Result<Value, Error> {
        let mut params = params.clone();
        params.set_default("format", "json");
        self.execute(Method::Get, &params).await
    }

    /// Send a POST request and return the parsed JSON body.
    ///
    /// A `token` of `__AUTO__` is replaced by the session's CSRF token,
    /// `assertuser` is added when the session is bound to a user and the
    /// caller did not set one, and the current `maxlag` is always attached.
    /// API errors other than `maxlag` fail with [`Error::Permission`].
    pub async fn post(&self, params: &Params) -> Result<Value, Error> {
        let mut params = params.clone();
        params.set_default("format", "json");

        if params.get("token") == Some(AUTO_TOKEN) {
            let token = self.current_csrf_token().ok_or(Error::MissingCsrfToken)?;
            trace!("substituting CSRF token");
            params.set("token", token.expose_secret());
        }
        if let Some(user) = &self.assert_user {
            params.set_default("assertuser", user.as_str());
        }
        params.set("maxlag", self.maxlag().to_string());

        self.execute(Method::Post, &params).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send the same request until the server stops answering `maxlag`.
    async fn execute(&self, method: Method, params: &Params) -> Result<Value, Error> {
        let mut attempts: u32 = 0;
        loop {
            match self.send_once(method, params).await? {
                Outcome::Done(value) => return Ok(value),
                Outcome::Lagged { retry_after, lag } => {
                    if self.policy.max_retries.is_some_and(|max| attempts >= max) {
                        return Err(Error::MaxlagRetriesExhausted { attempts });
                    }
                    attempts = attempts.saturating_add(1);
                    self.maxlag_retries.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        ?lag,
                        delay_secs = retry_after.as_secs_f64(),
                        attempt = attempts,
                        "server lagged, backing off"
                    );
                    tokio::time::sleep(retry_after).await;
                }
            }
        }
    }

    async fn send_once(&self, method: Method, params: &Params) -> Result<Outcome, Error> {
        let action = params.get("action").unwrap_or_default();
        let builder = match method {
            Method::Get => {
                debug!(action, "GET {}", self.api_url);
                self.http.get(self.api_url.clone()).query(params)
            }
            Method::Post => {
                debug!(action, "POST {}", self.api_url);
                self.http.post(self.api_url.clone()).form(params)
            }
        };
        let builder = match &self.http_auth {
            Some(auth) => builder.basic_auth(&auth.username, Some(auth.password.expose_secret())),
            None => builder,
        };

        let resp = builder.send().await?;
        self.parse_response(method, resp).await
    }

    /// Classify a response: success payload, maxlag backoff, or error.
    ///
    /// The action API reports failures as `{"error": {...}}`, usually with
    /// HTTP 200, so the body is checked before the status code.
    async fn parse_response(
        &self,
        method: Method,
        resp: reqwest::Response,
    ) -> Result<Outcome, Error> {
        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

        let body = resp.text().await?;
        let parsed: Option<Value> = serde_json::from_str(&body).ok();

        if let Some(err) = parsed.as_ref().and_then(|v| v.get("error")) {
            let err = ApiError::from_value(err);
            if err.code == "maxlag" {
                return Ok(Outcome::Lagged {
                    retry_after: retry_after.unwrap_or(self.policy.default_retry_after),
                    lag: err.lag,
                });
            }
            return Err(match method {
                Method::Post => Error::Permission {
                    code: err.code,
                    info: err.info,
                },
                Method::Get => Error::Request {
                    status: status.as_u16(),
                    code: Some(err.code).filter(|code| !code.is_empty()),
                    body,
                },
            });
        }

        if status != StatusCode::OK {
            return Err(Error::Request {
                status: status.as_u16(),
                code: None,
                body,
            });
        }

        match parsed {
            Some(value) => Ok(Outcome::Done(value)),
            None => {
                let preview: String = body.chars().take(200).collect();
                Err(Error::Deserialization {
                    message: format!("response is not JSON (body preview: {preview:?})"),
                    body,
                })
            }
        }
    }
}
