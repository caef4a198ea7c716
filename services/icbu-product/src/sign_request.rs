//! Router api parameter signature.

use std::fmt;
use std::str::FromStr;

use log::debug;
use toprest_core::hash::{upper_hex_hmac_sha256, upper_hex_md5};
use toprest_core::{Context, Error, ParameterSet, Result, SignRequest};

use crate::constants::*;
use crate::Credential;

/// Signature algorithm, sent as `sign_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignMethod {
    /// `md5(secret + pairs + secret)`
    #[default]
    Md5,
    /// `hmac_sha256(secret, pairs)`
    HmacSha256,
}

impl SignMethod {
    /// The wire value of `sign_method`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignMethod::Md5 => "md5",
            SignMethod::HmacSha256 => "hmac-sha256",
        }
    }
}

impl fmt::Display for SignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(SignMethod::Md5),
            "hmac-sha256" => Ok(SignMethod::HmacSha256),
            v => Err(Error::invalid_argument(format!(
                "unsupported sign method {v}, expected md5 or hmac-sha256"
            ))),
        }
    }
}

/// Concatenate `key + value` for every entry in ordinal key order.
///
/// A `sign` entry is never part of its own input.
///
/// ```text
/// app_key12345678formatjsonmethodalibaba.icbu.product.get...
/// ```
pub fn string_to_sign(params: &ParameterSet) -> String {
    let mut s = String::new();
    for (k, v) in params.iter().filter(|(k, _)| *k != PARAM_SIGN) {
        s.push_str(k);
        s.push_str(v);
    }
    s
}

/// Compute the signature of `params` with `secret`.
///
/// The result is a pure function of its inputs and is rendered as uppercase hex.
pub fn calculate_sign(params: &ParameterSet, secret: &str, method: SignMethod) -> String {
    let pairs = string_to_sign(params);
    debug!(
        "signing {} parameters with {method}: {:?}",
        params.len(),
        params.iter().map(|(k, _)| k).collect::<Vec<_>>()
    );

    match method {
        SignMethod::Md5 => {
            let mut content = String::with_capacity(pairs.len() + secret.len() * 2);
            content.push_str(secret);
            content.push_str(&pairs);
            content.push_str(secret);
            upper_hex_md5(content.as_bytes())
        }
        SignMethod::HmacSha256 => upper_hex_hmac_sha256(secret.as_bytes(), pairs.as_bytes()),
    }
}

/// RequestSigner completes a parameter set with the credential fields and
/// its signature.
#[derive(Debug, Default)]
pub struct RequestSigner {
    method: SignMethod,
}

impl RequestSigner {
    /// Create a signer using `method`.
    pub fn new(method: SignMethod) -> Self {
        Self { method }
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        params: &mut ParameterSet,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_missing("missing credential"))?;

        params.remove(PARAM_SIGN);
        params.insert(PARAM_APP_KEY, &cred.app_key);
        params.insert(PARAM_SESSION, &cred.session_key);
        params.insert(PARAM_SIGN_METHOD, self.method);

        let sign = calculate_sign(params, &cred.app_secret, self.method);
        params.insert(PARAM_SIGN, sign);
        Ok(())
    }
}
