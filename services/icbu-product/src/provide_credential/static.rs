use crate::Credential;
use async_trait::async_trait;
use toprest_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides static credentials that are provided at initialization time.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    app_key: String,
    app_secret: String,
    session_key: String,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider.
    pub fn new(app_key: &str, app_secret: &str, session_key: &str) -> Self {
        Self {
            app_key: app_key.to_string(),
            app_secret: app_secret.to_string(),
            session_key: session_key.to_string(),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(Credential::new(
            &self.app_key,
            &self.app_secret,
            &self.session_key,
        )))
    }
}
