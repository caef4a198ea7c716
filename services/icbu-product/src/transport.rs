//! The single HTTP round trip of a call.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use log::{debug, warn};
use toprest_core::{Context, ParameterSet, Result};

use crate::constants::*;
use crate::{RawResponse, ResponseFormat};

/// Issue one GET to `endpoint` with `params` as the query string.
///
/// The reply format follows the `Content-Type` header and falls back to
/// `requested`. HTTP status is not interpreted.
pub async fn send(
    ctx: &Context,
    endpoint: &str,
    params: &ParameterSet,
    requested: ResponseFormat,
) -> Result<RawResponse> {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    let url = format!("{endpoint}{sep}{}", params.to_query_string());
    debug!(
        "calling {} at {endpoint}",
        params.get(PARAM_METHOD).unwrap_or_default()
    );

    let req = http::Request::get(url).body(Bytes::new())?;
    let resp = ctx.http_send_as_string(req).await?;

    let status = resp.status();
    if !status.is_success() {
        warn!("router replied with http status {status}");
    }

    let format = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(ResponseFormat::from_content_type)
        .unwrap_or(requested);

    Ok(RawResponse {
        status,
        body: resp.into_body(),
        format,
    })
}
