// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Response formats and the classifier.
//!
//! Each format has a [`ResponseCodec`] that knows how to parse a response
//! body, find the error envelope, and render log artifacts.

use std::fmt;
use std::str::FromStr;

use toprest_core::{Error, ParameterSet, Result};

mod json;
pub use json::JsonCodec;

mod xml;
pub use xml::XmlCodec;

/// The `format` parameter of a call and the declared format of its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Structured data.
    Json,
    /// Markup.
    Xml,
}

impl ResponseFormat {
    /// The wire value of `format`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }

    /// File extension used for artifacts in this format.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// The codec for this format.
    pub fn codec(&self) -> &'static dyn ResponseCodec {
        match self {
            ResponseFormat::Json => &JsonCodec,
            ResponseFormat::Xml => &XmlCodec,
        }
    }

    /// Detect the format from a `Content-Type` header value.
    ///
    /// `text/javascript` is what the router sends for json replies.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime.ends_with("json") || mime.ends_with("javascript") {
            Some(ResponseFormat::Json)
        } else if mime.ends_with("xml") {
            Some(ResponseFormat::Xml)
        } else {
            None
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            v => Err(Error::invalid_argument(format!(
                "unsupported format {v}, expected json or xml"
            ))),
        }
    }
}

/// A parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured data tree.
    Json(serde_json::Value),
    /// Well-formed markup, normalized with two space indentation.
    Xml(String),
}

impl Payload {
    /// The format this payload was parsed from.
    pub fn format(&self) -> ResponseFormat {
        match self {
            Payload::Json(_) => ResponseFormat::Json,
            Payload::Xml(_) => ResponseFormat::Xml,
        }
    }
}

impl fmt::Display for Payload {
    /// Human readable form: indented json or normalized markup.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Json(v) => f.write_str(&json::to_pretty_string(v).map_err(|_| fmt::Error)?),
            Payload::Xml(s) => f.write_str(s),
        }
    }
}

/// Classification of a successfully parsed response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No error envelope at the top level.
    Success {
        /// The parsed body.
        payload: Payload,
    },
    /// The platform answered with an error envelope.
    ApiError {
        /// Message extracted from the envelope.
        message: String,
        /// The parsed body.
        payload: Payload,
    },
}

impl Outcome {
    /// The parsed body regardless of classification.
    pub fn payload(&self) -> &Payload {
        match self {
            Outcome::Success { payload } => payload,
            Outcome::ApiError { payload, .. } => payload,
        }
    }

    /// Returns true for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Raw reply of one api call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status, informational only.
    pub status: http::StatusCode,
    /// Body decoded as text.
    pub body: String,
    /// Declared format of `body`.
    pub format: ResponseFormat,
}

/// ResponseCodec is the per-format strategy used by the classifier and the
/// recorder.
pub trait ResponseCodec: fmt::Debug + Send + Sync + 'static {
    /// The format handled by this codec.
    fn format(&self) -> ResponseFormat;

    /// Parse `body` and look for the error envelope.
    ///
    /// Malformed input fails with `ErrorKind::Parse`.
    fn classify(&self, body: &str) -> Result<Outcome>;

    /// Render a request-only artifact.
    fn render_request(&self, params: &ParameterSet) -> Result<String>;

    /// Render a response-only artifact.
    fn render_response(&self, payload: &Payload) -> Result<String>;

    /// Render an artifact pairing the request with its response.
    fn render_combined(&self, params: &ParameterSet, payload: &Payload) -> Result<String>;

    /// Render an artifact pairing the request with a failure description.
    fn render_failure(&self, params: &ParameterSet, description: &str) -> Result<String>;
}

/// Classify a raw response with the codec of its declared format.
pub fn classify(raw: &RawResponse) -> Result<Outcome> {
    raw.format.codec().classify(&raw.body)
}
