//! Signed calls to the ICBU product router api.
//!
//! ## Example
//!
//! ```no_run
//! use toprest_core::{Context, OsEnv, Result};
//! use toprest_http_send_reqwest::ReqwestHttpSend;
//! use toprest_icbu_product::{ApiRequest, Client, Config, EnvCredentialProvider, Outcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Reads TOPREST_ENDPOINT and TOPREST_LOG_DIR when set.
//!     let config = Config::new().from_env(&ctx);
//!
//!     // Reads APP_KEY, APP_SECRET and SESSION_KEY.
//!     let client = Client::new(ctx, config, EnvCredentialProvider::new());
//!
//!     let req = ApiRequest::product_get("1600123456789")?;
//!     match client.invoke(&req).await?.outcome {
//!         Outcome::Success { payload } => println!("{payload}"),
//!         Outcome::ApiError { message, .. } => println!("Error: {message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Artifacts
//!
//! Every call writes into the log directory (default `api_logs`):
//!
//! - `request_<ts>`: the redacted request
//! - `response_<ts>`: the parsed reply
//! - `<slug>_logs_<ts>`: request and reply together
//! - `<slug>_error_<ts>`: request and failure description, if the call failed
//! - `error_response_<ts>`: request and reply, if the reply is an error envelope
//!
//! and appends to `<slug>.log`. `app_key`, `session` and `sign` are never
//! written.

#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::{calculate_sign, string_to_sign, RequestSigner, SignMethod};

mod redact;
pub use redact::{redact, SENSITIVE_PARAMS};

mod request;
pub use request::{ApiMethod, ApiRequest};

mod format;
pub use format::{
    classify, JsonCodec, Outcome, Payload, RawResponse, ResponseCodec, ResponseFormat, XmlCodec,
};

pub mod transport;

mod recorder;
pub use recorder::Recorder;

mod client;
pub use client::{Client, Invocation};
