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

use std::fmt::{Debug, Formatter};

use toprest_core::{utils::Redact, SigningCredential};

/// Credential for the router api.
#[derive(Clone)]
pub struct Credential {
    /// Application key, sent as `app_key`.
    pub app_key: String,
    /// Application secret. Used as signing key material only.
    pub app_secret: String,
    /// Authorized user session, sent as `session`.
    pub session_key: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        session_key: impl Into<String>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            session_key: session_key.into(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("app_key", &Redact::from(&self.app_key))
            .field("app_secret", &Redact::from(&self.app_secret))
            .field("session_key", &Redact::from(&self.session_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.app_key.is_empty() && !self.app_secret.is_empty() && !self.session_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let cred = Credential::new(
            "12345678",
            "0123456789abcdef0123",
            "6100e23657fb0b2d0c78568e55a3031134be9a3a5d4b3a365753805",
        );
        let out = format!("{cred:?}");

        assert!(!out.contains("12345678"));
        assert!(!out.contains("0123456789abcdef0123"));
        assert!(out.contains("610***805"));
    }

    #[test]
    fn test_is_valid() {
        assert!(Credential::new("k", "s", "t").is_valid());
        assert!(!Credential::new("k", "", "t").is_valid());
        assert!(!Credential::new("", "s", "t").is_valid());
        assert!(!Credential::new("k", "s", "").is_valid());
    }
}
