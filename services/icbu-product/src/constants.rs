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

// Env values read by the credential and config loaders.
pub const APP_KEY: &str = "APP_KEY";
pub const APP_SECRET: &str = "APP_SECRET";
pub const SESSION_KEY: &str = "SESSION_KEY";
pub const TOPREST_ENDPOINT: &str = "TOPREST_ENDPOINT";
pub const TOPREST_LOG_DIR: &str = "TOPREST_LOG_DIR";

// Defaults.
pub const DEFAULT_ENDPOINT: &str = "https://eco.taobao.com/router/rest";
pub const DEFAULT_PARTNER_ID: &str = "apidoc";
pub const DEFAULT_API_VERSION: &str = "2.0";
pub const DEFAULT_LOG_DIR: &str = "api_logs";

// Protocol parameters.
pub const PARAM_APP_KEY: &str = "app_key";
pub const PARAM_FORMAT: &str = "format";
pub const PARAM_METHOD: &str = "method";
pub const PARAM_PARTNER_ID: &str = "partner_id";
pub const PARAM_SESSION: &str = "session";
pub const PARAM_SIGN: &str = "sign";
pub const PARAM_SIGN_METHOD: &str = "sign_method";
pub const PARAM_TIMESTAMP: &str = "timestamp";
pub const PARAM_VERSION: &str = "v";
pub const PARAM_LANGUAGE: &str = "language";

// Method parameters.
pub const PARAM_PRODUCT_ID: &str = "product_id";
pub const PARAM_CAT_ID: &str = "cat_id";

// Error envelope.
pub const ERROR_RESPONSE: &str = "error_response";
pub const ERROR_MSG: &str = "msg";
pub const ERROR_SUB_MSG: &str = "sub_msg";
