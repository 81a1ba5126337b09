//! File identity ⇄ URL path segment.
//!
//! The segment is URL-safe base64 (unpadded) of `{"id":..,"storage":..}`
//! with the keys in sorted order. Because the id is a JSON string, ids
//! containing `/`, `=` or any other delimiter survive the round trip.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use serde_json::json;

use crate::DecodeError;

/// The `(storage, id)` pair a download request points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedIdentity {
    pub storage_key: String,
    pub id: String,
}

impl ResolvedIdentity {
    pub fn new<S: Into<String>, I: Into<String>>(storage_key: S, id: I) -> Self {
        Self {
            storage_key: storage_key.into(),
            id: id.into(),
        }
    }
}

#[derive(Deserialize)]
struct Payload {
    id: String,
    storage: String,
}

pub fn encode(storage_key: &str, id: &str) -> String {
    // "id" sorts before "storage" and is also inserted first, so the output is
    // the same with or without serde_json's preserve_order feature
    let payload = json!({ "id": id, "storage": storage_key });
    URL_SAFE_NO_PAD.encode(payload.to_string())
}

/// Decode a primary-route segment. Trailing `=` padding is tolerated and
/// unknown payload keys are ignored.
pub fn decode(segment: &str) -> Result<ResolvedIdentity, DecodeError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('='))?;
    let payload: Payload = serde_json::from_slice(&bytes)?;

    if payload.storage.is_empty() {
        return Err(DecodeError::Empty("storage"));
    }
    if payload.id.is_empty() {
        return Err(DecodeError::Empty("id"));
    }

    Ok(ResolvedIdentity::new(payload.storage, payload.id))
}

/// Identity of the old two-segment `/<storage>/<id>` route
pub fn decode_legacy(storage_key: &str, id: &str) -> Result<ResolvedIdentity, DecodeError> {
    if storage_key.is_empty() {
        return Err(DecodeError::Empty("storage"));
    }
    if id.is_empty() {
        return Err(DecodeError::Empty("id"));
    }
    Ok(ResolvedIdentity::new(storage_key, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;
    use proptest::prelude::*;

    #[test]
    fn encodes_sorted_json() {
        let segment = encode("store", "abc");
        let json = URL_SAFE_NO_PAD.decode(&segment).unwrap();
        assert_eq!(json, br#"{"id":"abc","storage":"store"}"#);
    }

    #[test]
    fn segment_is_path_safe() {
        let segment = encode("store", "a/b?c#d=e f");
        assert!(segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn accepts_padded_segments() {
        let padded = URL_SAFE.encode(r#"{"id":"abcd","storage":"store"}"#);
        assert!(padded.ends_with("=="));
        assert_eq!(decode(&padded).unwrap(), ResolvedIdentity::new("store", "abcd"));
    }

    #[test]
    fn ignores_extra_payload_keys() {
        let segment = URL_SAFE_NO_PAD
            .encode(r#"{"id":"abc","metadata":{"size":7},"storage":"store"}"#);
        assert_eq!(decode(&segment).unwrap(), ResolvedIdentity::new("store", "abc"));
    }

    #[test]
    fn rejects_malformed_segments() {
        assert!(matches!(decode("not base64!"), Err(DecodeError::Base64(_))));
        assert!(matches!(
            decode(&URL_SAFE_NO_PAD.encode("plain text")),
            Err(DecodeError::Payload(_))
        ));
        assert!(matches!(
            decode(&URL_SAFE_NO_PAD.encode(r#"{"id":"abc"}"#)),
            Err(DecodeError::Payload(_))
        ));
        assert!(matches!(
            decode(&encode("", "abc")),
            Err(DecodeError::Empty("storage"))
        ));
    }

    #[test]
    fn legacy_and_primary_agree() {
        let primary = decode(&encode("store", "abc")).unwrap();
        let legacy = decode_legacy("store", "abc").unwrap();
        assert_eq!(primary, legacy);
    }

    proptest! {
        #[test]
        fn round_trips(storage in "[a-z_]{1,12}", id in "\\PC{1,40}") {
            let decoded = decode(&encode(&storage, &id)).unwrap();
            prop_assert_eq!(decoded, ResolvedIdentity::new(storage, id));
        }
    }
}
