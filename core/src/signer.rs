use crate::{Context, Error, ParameterSet, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign parameter sets.
///
/// It loads the credential on first use, caches it while it stays valid, and
/// hands it to the service specific [`SignRequest`].
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// The context this signer was built with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Sign the parameter set in place.
    ///
    /// Fails with [`crate::ErrorKind::CredentialMissing`] if the provider
    /// yields nothing usable.
    pub async fn sign(&self, params: &mut ParameterSet) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            let loaded = self.loader.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        match credential {
            Some(cred) if cred.is_valid() => {
                self.builder
                    .sign_request(&self.ctx, params, Some(&cred))
                    .await
            }
            _ => Err(Error::credential_missing(
                "no valid credential available for signing",
            )),
        }
    }
}
