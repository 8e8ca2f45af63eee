// Session construction and login
//
// Login is the three-step action API flow: fetch a login token, POST the
// credentials with it (under a raised maxlag), then fetch the CSRF token
// used by every later write. The session cookie lands in the client's jar.

use std::sync::atomic::Ordering;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::auth::{AuthMode, Credentials, HttpAuth, assert_user_for};
use crate::error::Error;
use crate::params::Params;
use crate::session::client::{MaxlagPolicy, Session};
use crate::transport::TransportConfig;

/// Builder for [`Session`]. Finish with [`connect`](Self::connect).
#[derive(Debug)]
pub struct SessionBuilder {
    api_url: Url,
    username: Option<String>,
    password: Option<SecretString>,
    token: Option<SecretString>,
    http_auth: Option<HttpAuth>,
    transport: TransportConfig,
    policy: MaxlagPolicy,
    http: Option<reqwest::Client>,
}

impl SessionBuilder {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            username: None,
            password: None,
            token: None,
            http_auth: None,
            transport: TransportConfig::default(),
            policy: MaxlagPolicy::default(),
            http: None,
        }
    }

    /// Account to log in as (and to assert on writes).
    ///
    /// Without a password no login happens, but writes still carry
    /// `assertuser` for this account.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    pub fn credentials(self, credentials: Credentials) -> Self {
        self.username(credentials.username)
            .password(credentials.password)
    }

    /// Pre-issued CSRF token. Ignored when a password login is performed.
    pub fn token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn http_auth(mut self, auth: HttpAuth) -> Self {
        self.http_auth = Some(auth);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport = self.transport.with_user_agent(user_agent);
        self
    }

    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn policy(mut self, policy: MaxlagPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a pre-built `reqwest::Client` instead of building one from the
    /// transport config. It should carry a cookie store if logging in.
    pub fn client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the session, logging in first when username and password
    /// are both set.
    pub async fn connect(self) -> Result<Session, Error> {
        let http = match self.http {
            Some(http) => http,
            None => self.transport.build_client()?,
        };
        let mut session = Session::from_parts(http, self.api_url, self.policy, self.http_auth);

        match (self.username, self.password) {
            (Some(username), Some(password)) => {
                let credentials = Credentials::new(username, password);
                session.login(&credentials).await?;
                session.auth_mode = AuthMode::Login;
                session.assert_user = Some(credentials.assert_user().to_owned());
            }
            (username, _) => {
                if let Some(token) = self.token {
                    session.set_csrf_token(token);
                    session.auth_mode = AuthMode::Token;
                }
                session.assert_user = username.map(|u| assert_user_for(&u).to_owned());
            }
        }

        Ok(session)
    }
}

impl Session {
    /// Start building a session for `api_url`.
    pub fn builder(api_url: Url) -> SessionBuilder {
        SessionBuilder::new(api_url)
    }

    /// Log in with username/password and store a fresh CSRF token.
    ///
    /// The `maxlag` threshold is raised for the credential POST and
    /// restored afterwards whether or not the login succeeded.
    pub(crate) async fn login(&self, credentials: &Credentials) -> Result<(), Error> {
        debug!(user = %credentials.username, "requesting login token");
        let data = self
            .get(
                &Params::action("query")
                    .with("meta", "tokens")
                    .with("type", "login"),
            )
            .await?;
        let login_token = token_at(&data, "/query/tokens/logintoken")
            .ok_or_else(|| Error::Authentication {
                message: "server did not issue a login token".into(),
            })?
            .to_owned();

        let params = Params::action("login")
            .with("lgname", credentials.username.as_str())
            .with("lgpassword", credentials.password.expose_secret())
            .with("lgtoken", login_token);

        let raised = LoginMaxlag::raise(self);
        let result = self.post(&params).await;
        drop(raised);

        let data = result.map_err(|e| match e {
            Error::Permission { code, info } => Error::Authentication {
                message: format!("{code}: {info}"),
            },
            other => other,
        })?;

        let outcome = data.pointer("/login/result").and_then(Value::as_str);
        if outcome != Some("Success") {
            let message = match data.pointer("/login/reason") {
                Some(Value::String(reason)) => reason.clone(),
                Some(other) => other.to_string(),
                None => outcome
                    .unwrap_or("login response carried no result")
                    .to_owned(),
            };
            return Err(Error::Authentication { message });
        }
        info!(user = %credentials.username, "logged in");

        let data = self
            .get(&Params::action("query").with("meta", "tokens"))
            .await?;
        let csrf = token_at(&data, "/query/tokens/csrftoken").ok_or_else(|| {
            Error::Authentication {
                message: "server did not issue a CSRF token".into(),
            }
        })?;
        self.set_csrf_token(SecretString::from(csrf.to_owned()));
        Ok(())
    }
}

/// Holds the login `maxlag` until dropped, so the write threshold comes
/// back even when the login future is cancelled.
struct LoginMaxlag<'a> {
    session: &'a Session,
}

impl<'a> LoginMaxlag<'a> {
    fn raise(session: &'a Session) -> Self {
        session
            .maxlag
            .store(session.policy.login_maxlag, Ordering::Relaxed);
        Self { session }
    }
}

impl Drop for LoginMaxlag<'_> {
    fn drop(&mut self) {
        self.session
            .maxlag
            .store(self.session.policy.maxlag, Ordering::Relaxed);
    }
}

fn token_at<'a>(data: &'a Value, pointer: &str) -> Option<&'a str> {
    data.pointer(pointer).and_then(Value::as_str)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn cancelled_login_restores_maxlag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"tokens": {"logintoken": "lt+\\"}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"login": {"result": "Success"}}))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let api_url = Url::parse(&format!("{}/w/api.php", server.uri())).unwrap();
        let session = Session::with_client(reqwest::Client::new(), api_url);
        let credentials = Credentials::new("Bot", SecretString::from("secret".to_owned()));

        {
            let mut login = std::pin::pin!(session.login(&credentials));
            let raced = tokio::time::timeout(Duration::from_millis(500), login.as_mut()).await;
            assert!(raced.is_err());
            assert_eq!(session.maxlag(), 30);
        }

        assert_eq!(session.maxlag(), 5);
    }
}
