use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use log::warn;
use pretty_assertions::assert_eq;
use toprest_core::time::{parse_rfc3339, DateTime};
use toprest_core::{Context, Error, ErrorKind, HttpSend, OsEnv, Result, StaticEnv};
use toprest_http_send_reqwest::ReqwestHttpSend;
use toprest_icbu_product::{
    ApiRequest, Client, Config, EnvCredentialProvider, Outcome, Payload, StaticCredentialProvider,
};

/// Replies with a canned response, or fails like a refused connection.
#[derive(Debug, Default)]
struct StubHttpSend {
    reply: Option<(&'static str, &'static str)>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl StubHttpSend {
    fn replying(content_type: &'static str, body: &'static str) -> Self {
        Self {
            reply: Some((content_type, body)),
            ..Default::default()
        }
    }

    fn refusing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpSend for StubHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.seen.lock().unwrap().push(req.uri().to_string());

        let Some((content_type, body)) = self.reply else {
            return Err(Error::transport(
                "error sending request: tcp connect error: Connection refused (os error 111)",
            ));
        };
        Ok(http::Response::builder()
            .status(200)
            .header(http::header::CONTENT_TYPE, content_type)
            .body(Bytes::from_static(body.as_bytes()))?)
    }
}

fn at() -> DateTime {
    parse_rfc3339("2024-05-01T12:30:45+08:00").expect("must be valid")
}

fn client(http: StubHttpSend, log_dir: &Path) -> Client {
    let _ = env_logger::builder().is_test(true).try_init();

    Client::new(
        Context::new().with_http_send(http),
        Config::new()
            .with_endpoint("http://router.test/router/rest")
            .with_log_dir(log_dir),
        StaticCredentialProvider::new("12345678", "secret", "sess"),
    )
}

fn artifacts(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("log dir must exist")
        .map(|e| e.expect("entry must be readable").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn count_prefix(names: &[String], prefix: &str) -> usize {
    names.iter().filter(|n| n.starts_with(prefix)).count()
}

#[tokio::test]
async fn test_product_get_success() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let http = StubHttpSend::replying(
        "text/javascript;charset=UTF-8",
        r#"{"alibaba_icbu_product_get_response":{"product":{"subject":"Steel pipe"},"request_id":"abc"}}"#,
    );
    let seen = http.seen.clone();
    let client = client(http, dir.path());

    let invocation = client
        .invoke_at(&ApiRequest::product_get("1600123456789")?, at())
        .await?;
    assert!(invocation.outcome.is_success());
    assert_eq!(3, invocation.artifacts.len());

    let names = artifacts(dir.path());
    assert_eq!(
        vec![
            "productget.log",
            "productget_logs_2024-05-01_12-30-45.json",
            "request_2024-05-01_12-30-45.json",
            "response_2024-05-01_12-30-45.json",
        ],
        names
    );

    // The wire carries the credential and the known signature.
    let uri = seen.lock().unwrap().pop().expect("one request must be sent");
    assert!(uri.starts_with("http://router.test/router/rest?"));
    assert!(uri.contains("app_key=12345678"));
    assert!(uri.contains("session=sess"));
    assert!(uri.contains("sign=51A13FB532630E41C34CD9094F01B14B"));

    // Artifacts never do.
    for name in &names {
        let content = fs::read_to_string(dir.path().join(name))?;
        assert!(!content.contains("app_key"), "{name} leaks app_key");
        assert!(!content.contains("\"session\""), "{name} leaks session");
        assert!(!content.contains("51A13FB532630E41C34CD9094F01B14B"), "{name} leaks sign");
    }

    let trace = fs::read_to_string(dir.path().join("productget.log"))?;
    assert_eq!(1, trace.lines().count());
    assert!(trace.contains(r#" - DEBUG - Response: {"alibaba_icbu_product_get_response":{"product":{"subject":"Steel pipe"},"request_id":"abc"}}"#));

    let combined = fs::read_to_string(dir.path().join("productget_logs_2024-05-01_12-30-45.json"))?;
    assert!(combined.contains("\"request_params\""));
    assert!(combined.contains("\"subject\": \"Steel pipe\""));
    Ok(())
}

#[tokio::test]
async fn test_product_get_transport_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let client = client(StubHttpSend::refusing(), dir.path());

    let err = client
        .invoke_at(&ApiRequest::product_get("1600123456789")?, at())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::Transport, err.kind());

    let names = artifacts(dir.path());
    assert_eq!(1, count_prefix(&names, "productget_error_"));
    assert_eq!(0, count_prefix(&names, "productget_logs_"));
    assert_eq!(0, count_prefix(&names, "response_"));

    let error = fs::read_to_string(dir.path().join("productget_error_2024-05-01_12-30-45.json"))?;
    assert!(error.contains("\"error_message\": \"error sending request: tcp connect error"));
    assert!(error.contains("\"product_id\": \"1600123456789\""));

    let trace = fs::read_to_string(dir.path().join("productget.log"))?;
    assert!(trace.contains(" - ERROR - Request failed: error sending request"));
    Ok(())
}

#[tokio::test]
async fn test_product_get_api_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let client = client(
        StubHttpSend::replying(
            "application/json",
            r#"{"error_response":{"code":27,"msg":"Invalid session","sub_code":"invalid-sessionkey","request_id":"abc"}}"#,
        ),
        dir.path(),
    );

    let invocation = client
        .invoke_at(&ApiRequest::product_get("1600123456789")?, at())
        .await?;
    match &invocation.outcome {
        Outcome::ApiError { message, .. } => assert_eq!("Invalid session", message),
        other => panic!("expected api error, got {other:?}"),
    }

    let names = artifacts(dir.path());
    assert_eq!(1, count_prefix(&names, "error_response_"));
    assert_eq!(1, count_prefix(&names, "productget_logs_"));
    assert_eq!(0, count_prefix(&names, "productget_error_"));
    Ok(())
}

#[tokio::test]
async fn test_product_get_malformed_body() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let client = client(
        StubHttpSend::replying("application/json", "<html>502 Bad Gateway</html>"),
        dir.path(),
    );

    let err = client
        .invoke_at(&ApiRequest::product_get("1600123456789")?, at())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::Parse, err.kind());

    let names = artifacts(dir.path());
    assert_eq!(1, count_prefix(&names, "productget_error_"));
    assert_eq!(0, count_prefix(&names, "response_"));
    Ok(())
}

#[tokio::test]
async fn test_schema_render_xml() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let http = StubHttpSend::replying(
        "text/xml;charset=UTF-8",
        r#"<?xml version="1.0" encoding="utf-8" ?><alibaba_icbu_product_schema_render_response><result><biz_success>true</biz_success></result><request_id>abc</request_id></alibaba_icbu_product_schema_render_response>"#,
    );
    let seen = http.seen.clone();
    let client = client(http, dir.path());

    let invocation = client
        .invoke_at(&ApiRequest::schema_render("127", "1600123456789")?, at())
        .await?;
    let Outcome::Success {
        payload: Payload::Xml(xml),
    } = &invocation.outcome
    else {
        panic!("expected xml success, got {:?}", invocation.outcome);
    };
    assert!(xml.contains("<biz_success>true</biz_success>"));

    let uri = seen.lock().unwrap().pop().expect("one request must be sent");
    assert!(uri.contains("format=xml"));
    assert!(uri.contains("language=en_US"));
    assert!(uri.contains("cat_id=127"));

    let names = artifacts(dir.path());
    assert!(names.contains(&"product_schema_render_logs_2024-05-01_12-30-45.xml".to_string()));
    assert!(names.contains(&"product_schema_render.log".to_string()));
    assert_eq!(0, count_prefix(&names, "product_schema_render_error_"));
    Ok(())
}

#[tokio::test]
async fn test_schema_render_api_error_xml() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let client = client(
        StubHttpSend::replying(
            "text/xml",
            "<error_response><code>27</code><msg>Invalid session</msg></error_response>",
        ),
        dir.path(),
    );

    let invocation = client
        .invoke_at(&ApiRequest::schema_render("127", "1600123456789")?, at())
        .await?;
    assert!(!invocation.outcome.is_success());
    assert!(artifacts(dir.path()).contains(&"error_response_2024-05-01_12-30-45.xml".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_partial_env_credential() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ctx = Context::new()
        .with_http_send(StubHttpSend::replying("application/json", "{}"))
        .with_env(StaticEnv::from_pairs([("APP_KEY", "12345678"), ("APP_SECRET", "secret")]));
    let client = Client::new(
        ctx,
        Config::new().with_log_dir(dir.path()),
        EnvCredentialProvider::new(),
    );

    let err = client
        .invoke(&ApiRequest::product_get("1600123456789")?)
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::CredentialMissing, err.kind());
    assert!(err.to_string().contains("SESSION_KEY"));
    Ok(())
}

#[tokio::test]
async fn test_live_product_get() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();
    if env::var("TOPREST_ICBU_TEST").unwrap_or_default() != "on" {
        warn!("TOPREST_ICBU_TEST is not set, skipped");
        return Ok(());
    }

    let product_id =
        env::var("TOPREST_ICBU_PRODUCT_ID").expect("env TOPREST_ICBU_PRODUCT_ID must set");
    let dir = tempfile::tempdir()?;
    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::new().from_env(&ctx).with_log_dir(dir.path());
    let client = Client::new(ctx, config, EnvCredentialProvider::new());

    let invocation = client.invoke(&ApiRequest::product_get(&product_id)?).await?;
    assert!(!invocation.artifacts.is_empty());
    Ok(())
}
