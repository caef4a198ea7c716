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

//! Hash related utils.

use hmac::Hmac;
use hmac::Mac;
use md5::Digest;
use md5::Md5;
use sha2::Sha256;

/// Uppercase hex encoded MD5 hash.
///
/// Use this function instead of `hex::encode_upper(md5(content))` can reduce
/// extra copy.
pub fn upper_hex_md5(content: &[u8]) -> String {
    hex::encode_upper(Md5::digest(content).as_slice())
}

/// Uppercase hex encoded HMAC with SHA256 hash.
pub fn upper_hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    hex::encode_upper(h.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"", "D41D8CD98F00B204E9800998ECF8427E"; "empty")]
    #[test_case(b"Sa1b2S", "DB08FDC3F25263430791ACF66D2DE0C9"; "wrapped pairs")]
    fn test_upper_hex_md5(input: &[u8], expected: &str) {
        assert_eq!(expected, upper_hex_md5(input));
    }

    #[test]
    fn test_upper_hex_hmac_sha256() {
        assert_eq!(
            "E8613044BB0B2A6E2D5089152F88BFC6259EDF63AA3F84DDF4719690C0F98BDF",
            upper_hex_hmac_sha256(b"S", b"a1b2")
        );
    }
}
