use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

use toprest_core::{utils::Redact, Context};

use crate::constants::*;
use crate::{ApiMethod, ResponseFormat, SignMethod};

/// Config carries everything about a call except the credential.
///
/// Unset fields fall back to the platform defaults.
#[derive(Clone, Default)]
pub struct Config {
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `TOPREST_ENDPOINT`
    /// - default: `https://eco.taobao.com/router/rest`
    pub endpoint: Option<String>,
    /// `partner_id` sent with every call, default `apidoc`.
    pub partner_id: Option<String>,
    /// `v` sent with every call, default `2.0`.
    pub api_version: Option<String>,
    /// `language` for every call, overriding the per-method default.
    pub language: Option<String>,
    /// Requested reply format, overriding the per-method default.
    pub format: Option<ResponseFormat>,
    /// Signature algorithm, default md5.
    pub sign_method: Option<SignMethod>,
    /// `log_dir` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `TOPREST_LOG_DIR`
    /// - default: `api_logs`
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set partner_id
    pub fn with_partner_id(mut self, partner_id: impl Into<String>) -> Self {
        self.partner_id = Some(partner_id.into());
        self
    }

    /// Set api_version
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Set language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set format
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set sign_method
    pub fn with_sign_method(mut self, sign_method: SignMethod) -> Self {
        self.sign_method = Some(sign_method);
        self
    }

    /// Set log_dir
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    /// Load config from env.
    ///
    /// Fields that are already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(TOPREST_ENDPOINT).filter(|v| !v.is_empty()) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(TOPREST_LOG_DIR).filter(|v| !v.is_empty()) {
            self.log_dir.get_or_insert(v.into());
        }

        self
    }

    /// The router url.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// The `partner_id` value.
    pub fn partner_id(&self) -> &str {
        self.partner_id.as_deref().unwrap_or(DEFAULT_PARTNER_ID)
    }

    /// The `v` value.
    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    /// The format to request for `method`.
    pub fn format_for(&self, method: ApiMethod) -> ResponseFormat {
        self.format.unwrap_or(method.default_format())
    }

    /// The signature algorithm.
    pub fn sign_method(&self) -> SignMethod {
        self.sign_method.unwrap_or_default()
    }

    /// Directory receiving artifacts and trace files.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("partner_id", &self.partner_id.as_ref().map(Redact::from))
            .field("api_version", &self.api_version)
            .field("language", &self.language)
            .field("format", &self.format)
            .field("sign_method", &self.sign_method)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}
