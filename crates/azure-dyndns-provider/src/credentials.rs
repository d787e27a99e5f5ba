//! Service-principal credential resolution and token acquisition.
//!
//! * **Explicit** – the configuration carries a complete
//!   `client_id` / `client_secret` / `tenant_id` triple.
//! * **Ambient**  – anything less falls through to the `AZURE_CLIENT_ID`,
//!   `AZURE_CLIENT_SECRET` and `AZURE_TENANT_ID` environment variables,
//!   the convention the official SDKs read.

use azure_dyndns_core::{Config, Error};
use reqwest::Client;
use serde::Deserialize;
use std::env;
use tracing::debug;

const LOGIN_ROOT: &str = "https://login.microsoftonline.com";
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";

/// A complete client-credential triple, whichever strategy produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Strategy, decided purely on presence of the explicit triple; no partial
/// combination is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    Ambient,
}

impl CredentialSource {
    pub fn from_config(cfg: &Config) -> Self {
        if !cfg.client_id.is_empty() && !cfg.client_secret.is_empty() && !cfg.tenant_id.is_empty()
        {
            Self::Explicit
        } else {
            Self::Ambient
        }
    }
}

/// Resolve the triple from the config or the process environment.
pub fn resolve_credentials(cfg: &Config) -> Result<ClientCredentials, Error> {
    match CredentialSource::from_config(cfg) {
        CredentialSource::Explicit => Ok(ClientCredentials {
            tenant_id: cfg.tenant_id.clone(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
        }),
        CredentialSource::Ambient => {
            debug!("explicit credential triple incomplete, reading environment");
            ambient_from(|name| env::var(name).ok())
        }
    }
}

fn ambient_from(lookup: impl Fn(&str) -> Option<String>) -> Result<ClientCredentials, Error> {
    let get = |name: &str| match lookup(name) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Auth(format!("environment variable {name} is not set"))),
    };
    Ok(ClientCredentials {
        tenant_id: get(ENV_TENANT_ID)?,
        client_id: get(ENV_CLIENT_ID)?,
        client_secret: get(ENV_CLIENT_SECRET)?,
    })
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange the triple for a management-plane bearer token.
pub async fn fetch_token(client: &Client, creds: &ClientCredentials) -> Result<String, Error> {
    let url = format!("{LOGIN_ROOT}/{}/oauth2/v2.0/token", creds.tenant_id);
    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("scope", MANAGEMENT_SCOPE),
    ];

    let resp = client
        .post(&url)
        .form(&params)
        .send()
        .await
        .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let msg = error_description(&body).unwrap_or_else(|| status.to_string());
        return Err(Error::Auth(format!("token endpoint refused the credentials: {msg}")));
    }

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| Error::Auth(format!("malformed token response: {e}")))?;
    Ok(token.access_token)
}

/// AAD error bodies carry a readable `error_description`.
fn error_description(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error_description")?
        .as_str()
        .map(str::to_owned)
}
