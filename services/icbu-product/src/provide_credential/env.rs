use crate::{constants::*, Credential};
use async_trait::async_trait;
use log::debug;
use toprest_core::{Context, Error, ProvideCredential, Result};

/// EnvCredentialProvider loads credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `APP_KEY`: The application key
/// - `APP_SECRET`: The application secret
/// - `SESSION_KEY`: The authorized session key
///
/// Empty values count as absent. If none of them is set the provider
/// returns `Ok(None)`; if only some are set it fails with
/// `CredentialMissing` naming the absent ones.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let lookup = |key: &str| ctx.env_var(key).filter(|v| !v.trim().is_empty());

        let app_key = lookup(APP_KEY);
        let app_secret = lookup(APP_SECRET);
        let session_key = lookup(SESSION_KEY);

        match (app_key, app_secret, session_key) {
            (Some(app_key), Some(app_secret), Some(session_key)) => {
                debug!("loaded credential from environment");
                Ok(Some(Credential {
                    app_key,
                    app_secret,
                    session_key,
                }))
            }
            (None, None, None) => Ok(None),
            (app_key, app_secret, session_key) => {
                let missing: Vec<&str> = [
                    (APP_KEY, app_key.is_none()),
                    (APP_SECRET, app_secret.is_none()),
                    (SESSION_KEY, session_key.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(name, _)| name)
                .collect();

                Err(Error::credential_missing(format!(
                    "environment variable {} must be set",
                    missing.join(", ")
                )))
            }
        }
    }
}
