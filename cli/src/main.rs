//! `toprest`: call ICBU product router methods from the command line.
//!
//! Credentials come from `APP_KEY`, `APP_SECRET` and `SESSION_KEY`; a `.env`
//! file in the working directory is loaded first.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::debug;
use toprest_core::{Context, Error, ErrorKind, OsEnv, Result};
use toprest_http_send_reqwest::ReqwestHttpSend;
use toprest_icbu_product::{
    ApiRequest, Client, Config, EnvCredentialProvider, Outcome, ResponseFormat, SignMethod,
};

/// Exit status for a reply carrying an error envelope, with `--fail-on-api-error`.
const API_ERROR_EXIT: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "toprest",
    version,
    about = "Call ICBU product router methods and keep a log of every call."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Reply format [default: json for product-get, xml for schema-render]
    #[arg(long, global = true, value_name = "json|xml")]
    format: Option<ResponseFormat>,

    /// Directory for artifacts and trace files [env: TOPREST_LOG_DIR, default: api_logs]
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Router url [env: TOPREST_ENDPOINT]
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// `language` sent with the call, overriding the per-method default
    #[arg(long, global = true, value_name = "LANG")]
    language: Option<String>,

    /// Signature algorithm
    #[arg(long, global = true, value_name = "md5|hmac-sha256")]
    sign_method: Option<SignMethod>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Exit with status 3 when the platform answers with an error envelope
    #[arg(long, global = true)]
    fail_on_api_error: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch one product (alibaba.icbu.product.get)
    ProductGet {
        /// Product id
        product_id: String,
    },
    /// Render the publishing schema of a product (alibaba.icbu.product.schema.render)
    SchemaRender {
        /// Category id
        cat_id: String,
        /// Product id
        product_id: String,
    },
}

impl Cli {
    fn request(&self) -> Result<ApiRequest> {
        match &self.command {
            Command::ProductGet { product_id } => ApiRequest::product_get(product_id),
            Command::SchemaRender { cat_id, product_id } => {
                ApiRequest::schema_render(cat_id, product_id)
            }
        }
    }

    /// Config from flags only; env fallbacks are applied by the caller.
    fn config(&self) -> Config {
        let mut config = Config::new();
        config.endpoint = self.endpoint.clone();
        config.language = self.language.clone();
        config.format = self.format;
        config.sign_method = self.sign_method;
        config.log_dir = self.log_dir.clone();
        config
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| Error::unexpected("failed to build http client").with_source(e))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version are not errors.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{}", failure_message(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let request = cli.request()?;

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::new(cli.http_client()?))
        .with_env(OsEnv);
    let config = cli.config().from_env(&ctx);
    debug!("running {} with {config:?}", request.method());

    let client = Client::new(ctx, config, EnvCredentialProvider::new());
    let invocation = client.invoke(&request).await?;

    println!("{}", render_outcome(&invocation.outcome));
    Ok(exit_status(&invocation.outcome, cli.fail_on_api_error))
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success { payload } => format!("API call successful.\n{payload}"),
        Outcome::ApiError { message, .. } => format!("Error: {message}"),
    }
}

fn exit_status(outcome: &Outcome, fail_on_api_error: bool) -> u8 {
    match outcome {
        Outcome::ApiError { .. } if fail_on_api_error => API_ERROR_EXIT,
        _ => 0,
    }
}

fn failure_message(err: &Error) -> String {
    match err.kind() {
        ErrorKind::Transport => format!("Request failed: {err}"),
        _ => format!("Error: {err}"),
    }
}
