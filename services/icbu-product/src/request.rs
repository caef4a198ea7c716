//! Unsigned parameter sets for the supported api methods.

use std::fmt;

use toprest_core::time::DateTime;
use toprest_core::{Error, ParameterSet, Result};

use crate::constants::*;
use crate::{Config, ResponseFormat};

/// A supported router api method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    /// `alibaba.icbu.product.get`
    ProductGet,
    /// `alibaba.icbu.product.schema.render`
    ProductSchemaRender,
}

impl ApiMethod {
    /// The wire value of `method`.
    pub fn name(&self) -> &'static str {
        match self {
            ApiMethod::ProductGet => "alibaba.icbu.product.get",
            ApiMethod::ProductSchemaRender => "alibaba.icbu.product.schema.render",
        }
    }

    /// Prefix used for this method's artifacts and trace file.
    pub fn slug(&self) -> &'static str {
        match self {
            ApiMethod::ProductGet => "productget",
            ApiMethod::ProductSchemaRender => "product_schema_render",
        }
    }

    /// `language` sent when nothing overrides it.
    pub fn default_language(&self) -> &'static str {
        match self {
            ApiMethod::ProductGet => "ENGLISH",
            ApiMethod::ProductSchemaRender => "en_US",
        }
    }

    /// `format` requested when nothing overrides it.
    pub fn default_format(&self) -> ResponseFormat {
        match self {
            ApiMethod::ProductGet => ResponseFormat::Json,
            ApiMethod::ProductSchemaRender => ResponseFormat::Xml,
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One api call before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: ApiMethod,
    fields: ParameterSet,
    language: Option<String>,
}

impl ApiRequest {
    /// `alibaba.icbu.product.get` for `product_id`.
    pub fn product_get(product_id: &str) -> Result<Self> {
        let fields =
            ParameterSet::new().with(PARAM_PRODUCT_ID, required(PARAM_PRODUCT_ID, product_id)?);
        Ok(Self {
            method: ApiMethod::ProductGet,
            fields,
            language: None,
        })
    }

    /// `alibaba.icbu.product.schema.render` for `product_id` in category `cat_id`.
    pub fn schema_render(cat_id: &str, product_id: &str) -> Result<Self> {
        let fields = ParameterSet::new()
            .with(PARAM_CAT_ID, required(PARAM_CAT_ID, cat_id)?)
            .with(PARAM_PRODUCT_ID, required(PARAM_PRODUCT_ID, product_id)?);
        Ok(Self {
            method: ApiMethod::ProductSchemaRender,
            fields,
            language: None,
        })
    }

    /// Override `language` for this request only.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// The method this request calls.
    pub fn method(&self) -> ApiMethod {
        self.method
    }

    /// Build the unsigned parameter set.
    ///
    /// `timestamp` is the invocation time and must be the same instant used
    /// to name the artifacts of this call.
    pub fn build(&self, config: &Config, timestamp: DateTime) -> ParameterSet {
        let language = self
            .language
            .as_deref()
            .or(config.language.as_deref())
            .unwrap_or(self.method.default_language());

        let mut params = self.fields.clone();
        params.insert(PARAM_FORMAT, config.format_for(self.method));
        params.insert(PARAM_METHOD, self.method);
        params.insert(PARAM_PARTNER_ID, config.partner_id());
        params.insert_timestamp(PARAM_TIMESTAMP, timestamp);
        params.insert(PARAM_VERSION, config.api_version());
        params.insert(PARAM_LANGUAGE, language);
        params
    }
}

fn required(name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::invalid_argument(format!("{name} must not be empty")));
    }
    Ok(value.to_string())
}
