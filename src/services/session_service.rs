use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

const AUTH_FILE: &str = "auth.json";
const TOKEN_PARAM: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
struct StoredAuth {
    #[serde(rename = "authToken")]
    auth_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBootstrap {
    /// The caller's URL with the token parameter removed, so the webview can
    /// rewrite its history without reloading. `None` when nothing changed.
    pub sanitized_url: Option<String>,
    pub has_token: bool,
}

/// Captures the bearer credential handed over via the `token` query parameter
/// and keeps it in the app data directory. The token is opaque: no shape
/// validation, no expiry, no refresh.
pub struct SessionService {
    auth_path: PathBuf,
    launch_url: RwLock<Option<String>>,
}

impl SessionService {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            auth_path: data_dir.join(AUTH_FILE),
            launch_url: RwLock::new(None),
        }
    }

    /// Resolves the credential from the given URL. A URL token always wins
    /// over a previously stored one and is persisted immediately; the
    /// returned URL no longer carries the parameter.
    pub fn bootstrap(&self, current_url: &str) -> SessionBootstrap {
        if let Ok(mut guard) = self.launch_url.write() {
            *guard = Some(current_url.to_string());
        }

        let Some((token, sanitized)) = extract_token(current_url) else {
            return SessionBootstrap {
                sanitized_url: None,
                has_token: !self.auth_token().is_empty(),
            };
        };

        self.persist(&token);
        debug!(target: "app::session", "token captured from launch url");

        SessionBootstrap {
            sanitized_url: Some(sanitized),
            has_token: true,
        }
    }

    /// Durable storage first, then the captured launch URL; `""` when the
    /// credential is absent. Storage failures are swallowed and reported as
    /// "no token" — callers treat that as a hard precondition failure.
    pub fn auth_token(&self) -> String {
        if let Some(token) = self.read_stored() {
            return token;
        }

        let guard = match self.launch_url.read() {
            Ok(guard) => guard,
            Err(_) => return String::new(),
        };
        guard
            .as_deref()
            .and_then(|raw| extract_token(raw).map(|(token, _)| token))
            .unwrap_or_default()
    }

    fn read_stored(&self) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.auth_path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(target: "app::session", error = %err, "failed to read stored auth");
                }
                return None;
            }
        };

        match serde_json::from_str::<StoredAuth>(&raw) {
            Ok(stored) if !stored.auth_token.trim().is_empty() => Some(stored.auth_token),
            Ok(_) => None,
            Err(err) => {
                warn!(target: "app::session", error = %err, "stored auth is not valid JSON");
                None
            }
        }
    }

    fn persist(&self, token: &str) {
        let stored = StoredAuth {
            auth_token: token.to_string(),
        };
        let payload = match serde_json::to_string(&stored) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(target: "app::session", error = %err, "failed to serialize auth");
                return;
            }
        };

        if let Some(parent) = self.auth_path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(target: "app::session", error = %err, "failed to create auth directory");
                return;
            }
        }

        if let Err(err) = std::fs::write(&self.auth_path, payload) {
            warn!(target: "app::session", error = %err, "failed to persist auth");
        }
    }
}

/// Pulls the token parameter out of the URL and rebuilds it without the
/// parameter. Returns `None` when the URL is unparseable or carries no token.
fn extract_token(raw: &str) -> Option<(String, String)> {
    let mut url = Url::parse(raw).ok()?;

    let token = url
        .query_pairs()
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())?;
    if token.is_empty() {
        return None;
    }

    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != TOKEN_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if remaining.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &remaining {
            pairs.append_pair(key, value);
        }
        drop(pairs);
    }

    Some((token, url.to_string()))
}
