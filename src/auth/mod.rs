//! Bearer-token resolution for ERP API requests.
//!
//! The backend accepts tokens minted by two historical auth flows, stored
//! under the legacy key names `django_token` and `access_token`. Resolution
//! order is centralized here (env override, then `django_token`, then
//! `access_token`) so every service client injects the same token the same
//! way instead of re-implementing the lookup.

use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::Deserialize;

/// Environment variable that overrides any stored credential.
pub const TOKEN_ENV_VAR: &str = "CAMPUS_API_TOKEN";

/// Resolves the bearer token to attach to an outgoing request, if any.
///
/// Resolved once per request construction, so a token refreshed on disk is
/// picked up by the next request without restarting the process.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Credential store backed by a JSON file with the two legacy key names.
///
/// File shape: `{"django_token": "...", "access_token": "..."}`; either key
/// may be absent. `django_token` wins when both are present.
pub struct CredentialsFile {
    path: PathBuf,
}

#[derive(Deserialize, Default)]
struct StoredCredentials {
    django_token: Option<String>,
    access_token: Option<String>,
}

impl CredentialsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> StoredCredentials {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path:% = self.path.display(), error:% = err; "No credentials file");
                return StoredCredentials::default();
            },
        };
        match serde_json::from_str(&raw) {
            Ok(creds) => creds,
            Err(err) => {
                debug!(path:% = self.path.display(), error:% = err; "Unreadable credentials file");
                StoredCredentials::default()
            },
        }
    }
}

impl TokenSource for CredentialsFile {
    fn token(&self) -> Option<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                return Some(token);
            }
        }
        let creds = self.read();
        creds
            .django_token
            .filter(|t| !t.trim().is_empty())
            .or(creds.access_token.filter(|t| !t.trim().is_empty()))
    }
}

/// Fixed token, for `--token` CLI overrides and tests.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

/// Anonymous requests: no `Authorization` header is attached.
pub struct NoToken;

impl TokenSource for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn credentials_with(body: &str) -> (tempfile::TempDir, CredentialsFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        (dir, CredentialsFile::new(path))
    }

    #[test]
    #[serial]
    fn django_token_wins_over_access_token() {
        let (_dir, creds) = credentials_with(r#"{"django_token":"legacy","access_token":"newer"}"#);
        assert_eq!(creds.token().as_deref(), Some("legacy"));
    }

    #[test]
    #[serial]
    fn access_token_used_when_django_token_absent() {
        let (_dir, creds) = credentials_with(r#"{"access_token":"newer"}"#);
        assert_eq!(creds.token().as_deref(), Some("newer"));
    }

    #[test]
    #[serial]
    fn missing_file_resolves_to_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let creds = CredentialsFile::new(dir.path().join("absent.json"));
        assert_eq!(creds.token(), None);
    }

    #[test]
    #[serial]
    fn blank_tokens_are_ignored() {
        let (_dir, creds) = credentials_with(r#"{"django_token":"  ","access_token":"real"}"#);
        assert_eq!(creds.token().as_deref(), Some("real"));
    }

    #[test]
    #[serial]
    fn env_var_overrides_stored_credentials() {
        let (_dir, creds) = credentials_with(r#"{"django_token":"stored"}"#);
        unsafe { std::env::set_var(TOKEN_ENV_VAR, "from-env") };
        let token = creds.token();
        unsafe { std::env::remove_var(TOKEN_ENV_VAR) };
        assert_eq!(token.as_deref(), Some("from-env"));
    }
}
