//! Turns provider payloads into structured values.

use crate::domain::{DecodedResult, ProviderResult};
use crate::errors::DecodeError;

/// Parse a provider payload as a single JSON document.
///
/// # Errors
/// If the payload is not well-formed JSON, including payloads with trailing
/// content after the document. No partial value is returned.
pub fn decode(raw: &ProviderResult) -> Result<DecodedResult, DecodeError> {
    Ok(serde_json::from_str(raw.as_str())?)
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::domain::ProviderResult;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn well_formed_payloads_decode_to_their_fields() {
        let raw = ProviderResult::new(
            r#"{"default":{"timelineData":[{"time":"1714521600","value":[42]}]}}"#,
        );
        assert_eq!(
            decode(&raw).expect("payload should decode"),
            json!({"default": {"timelineData": [{"time": "1714521600", "value": [42]}]}})
        );
    }

    #[test]
    fn arrays_and_scalars_are_documents_too() {
        assert_eq!(decode(&ProviderResult::new("[1, 2]")).unwrap(), json!([1, 2]));
        assert_eq!(decode(&ProviderResult::new("null")).unwrap(), json!(null));
    }

    #[test]
    fn malformed_payloads_fail() {
        for payload in ["", "{", "<html>rate limited</html>", r#"{"a": 1} trailing"#] {
            assert!(
                decode(&ProviderResult::new(payload)).is_err(),
                "{:?} should not decode",
                payload
            );
        }
    }
}
