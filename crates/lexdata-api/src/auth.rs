use secrecy::SecretString;

/// How a [`Session`](crate::Session) authenticated.
///
/// Marker enum (no data) -- the secret material lives in [`Credentials`]
/// or the session's CSRF token. Useful for branching on auth state without
/// carrying secrets around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No login, no token. Reads only.
    Anonymous,
    /// Username/password login performed at construction.
    Login,
    /// Externally supplied CSRF token (pre-authenticated sessions).
    Token,
}

/// Username/password pair for the `action=login` flow.
///
/// Bot passwords use the `Account@BotName` form; the part before the `@`
/// is the account the edits are attributed to.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// The account name used for `assertuser`.
    pub fn assert_user(&self) -> &str {
        assert_user_for(&self.username)
    }
}

/// HTTP basic auth sent alongside every request (for wikis behind a proxy).
#[derive(Debug, Clone)]
pub struct HttpAuth {
    pub username: String,
    pub password: SecretString,
}

/// Account name for a login name: everything before the first `@`.
pub fn assert_user_for(username: &str) -> &str {
    username.split_once('@').map_or(username, |(account, _)| account)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_password_suffix_is_dropped() {
        assert_eq!(assert_user_for("Example@lexbot"), "Example");
        assert_eq!(assert_user_for("Example"), "Example");
        assert_eq!(assert_user_for("A@b@c"), "A");
    }

    #[test]
    fn credentials_assert_user() {
        let creds = Credentials::new("Someone@tool", SecretString::from("pw".to_owned()));
        assert_eq!(creds.assert_user(), "Someone");
    }
}
