use toprest_core::ParameterSet;

use crate::constants::*;

/// Keys that never leave the process except on the wire.
pub const SENSITIVE_PARAMS: [&str; 3] = [PARAM_APP_KEY, PARAM_SESSION, PARAM_SIGN];

/// Return a copy of `params` that is safe to persist.
pub fn redact(params: &ParameterSet) -> ParameterSet {
    params.without(&SENSITIVE_PARAMS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn signed() -> ParameterSet {
        [
            ("app_key", "12345678"),
            ("format", "json"),
            ("method", "alibaba.icbu.product.get"),
            ("session", "sess"),
            ("sign", "51A13FB532630E41C34CD9094F01B14B"),
            ("sign_method", "md5"),
            ("product_id", "1600123456789"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_redact_removes_sensitive_keys() {
        let out = redact(&signed());

        for key in SENSITIVE_PARAMS {
            assert!(!out.contains_key(key), "{key} must be redacted");
        }
        assert_eq!(
            vec!["format", "method", "product_id", "sign_method"],
            out.iter().map(|(k, _)| k).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_redact_does_not_mutate() {
        let params = signed();
        let before = params.clone();
        let _ = redact(&params);
        assert_eq!(before, params);
    }

    #[test]
    fn test_redact_without_sensitive_keys() {
        let params: ParameterSet = [("format", "xml")].into_iter().collect();
        assert_eq!(params, redact(&params));
    }
}
