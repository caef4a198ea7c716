use std::path::PathBuf;

use log::{debug, warn, Level};
use toprest_core::time::{now, DateTime};
use toprest_core::{Context, Error, ParameterSet, ProvideCredential, Result, Signer};

use crate::format::classify;
use crate::{
    redact, transport, ApiRequest, Config, Credential, Outcome, Payload, Recorder,
    RequestSigner,
};

/// Result of one completed api call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The classified reply.
    pub outcome: Outcome,
    /// Artifacts written for this call, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// Client runs api calls: build, sign, send, classify and record.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    config: Config,
    signer: Signer<Credential>,
}

impl Client {
    /// Create a client that signs with credentials from `provider`.
    pub fn new(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        let signer = Signer::new(
            ctx.clone(),
            provider,
            RequestSigner::new(config.sign_method()),
        );
        Self {
            ctx,
            config,
            signer,
        }
    }

    /// The config of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `req` now.
    pub async fn invoke(&self, req: &ApiRequest) -> Result<Invocation> {
        self.invoke_at(req, now()).await
    }

    /// Run `req` with `at` as invocation time.
    ///
    /// `at` is both the signed `timestamp` and the artifact name stamp.
    ///
    /// An api error envelope is an `Ok` outcome. Transport and parse
    /// failures record a `<slug>_error_` artifact before returning.
    pub async fn invoke_at(&self, req: &ApiRequest, at: DateTime) -> Result<Invocation> {
        let method = req.method();
        let format = self.config.format_for(method);
        let recorder = Recorder::new(self.config.log_dir(), method, format, at);

        let mut params = req.build(&self.config, at);
        self.signer.sign(&mut params).await?;
        let redacted = redact(&params);
        debug!("invoking {method} with {redacted:?}");

        let mut artifacts = vec![recorder.record_request(&redacted)?];

        let raw = match transport::send(&self.ctx, self.config.endpoint(), &params, format).await {
            Ok(raw) => raw,
            Err(err) => return Err(record_failure(&recorder, &redacted, "Request failed", err)),
        };
        let outcome = match classify(&raw) {
            Ok(outcome) => outcome,
            Err(err) => return Err(record_failure(&recorder, &redacted, "Invalid response", err)),
        };

        artifacts.push(recorder.record_response(outcome.payload())?);
        artifacts.push(recorder.record_combined(&redacted, outcome.payload())?);
        recorder.trace(
            Level::Debug,
            &format!("Response: {}", single_line(outcome.payload(), &raw.body)),
        )?;

        if let Outcome::ApiError { message, payload } = &outcome {
            artifacts.push(recorder.record_api_error(&redacted, payload)?);
            recorder.trace(Level::Error, &format!("Error: {message}"))?;
        }

        Ok(Invocation { outcome, artifacts })
    }
}

/// A one-line form of the reply for the trace file.
///
/// Json is re-serialized compactly. Markup uses the body as received with
/// its lines trimmed and joined.
fn single_line(payload: &Payload, body: &str) -> String {
    match payload {
        Payload::Json(v) => v.to_string(),
        Payload::Xml(_) => body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Record `err` as the call's error artifact and return it unchanged.
///
/// A failure to record is logged, never returned in place of `err`.
fn record_failure(
    recorder: &Recorder,
    redacted: &ParameterSet,
    context: &str,
    err: Error,
) -> Error {
    if let Err(e) = recorder.record_error(redacted, err.message()) {
        warn!("failed to record error artifact: {e}");
    }
    if let Err(e) = recorder.trace(Level::Error, &format!("{context}: {err}")) {
        warn!("failed to append trace: {e}");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use toprest_core::ErrorKind;

    use crate::EnvCredentialProvider;

    #[test]
    fn test_single_line() {
        let json = Payload::Json(serde_json::json!({"rsp": {"id": 1, "subject": "Steel pipe"}}));
        assert_eq!(
            r#"{"rsp":{"id":1,"subject":"Steel pipe"}}"#,
            single_line(&json, "ignored")
        );

        let body = "<?xml version=\"1.0\"?>\n<rsp>\n  <a>1</a>\n</rsp>\n";
        let xml = Payload::Xml(String::new());
        assert_eq!(
            r#"<?xml version="1.0"?> <rsp> <a>1</a> </rsp>"#,
            single_line(&xml, body)
        );
    }

    #[tokio::test]
    async fn test_missing_credential_writes_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let client = Client::new(
            Context::new(),
            Config::new().with_log_dir(dir.path()),
            EnvCredentialProvider::new(),
        );

        let err = client
            .invoke(&ApiRequest::product_get("1600123456789")?)
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::CredentialMissing, err.kind());
        assert!(!dir.path().join("productget.log").exists());
        assert_eq!(0, std::fs::read_dir(dir.path())?.count());
        Ok(())
    }
}
