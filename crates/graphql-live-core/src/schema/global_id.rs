//! Opaque global identifiers and connection cursors.
//!
//! A global id is the standard base64 encoding of `"{type_name}:{raw_id}"`.
//! Decoding splits on the first `:`, so raw ids may contain the separator
//! but type names may not. The encoding carries no process state, so the
//! same pair always produces the same string across restarts.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::errors::{LiveError, LiveResult};

const SEPARATOR: char = ':';

/// Encode `(type_name, raw_id)` as an opaque cursor.
///
/// `type_name` must not contain `:`. A type name with the separator would
/// encode to the same string as a shorter type with a longer id.
#[cfg_attr(feature = "python", pyfunction)]
pub fn encode_global_id(type_name: &str, raw_id: &str) -> String {
    debug_assert!(
        !type_name.contains(SEPARATOR),
        "type name {type_name:?} contains the cursor separator"
    );
    STANDARD.encode(format!("{type_name}{SEPARATOR}{raw_id}"))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn decode_global_id(cursor: &str) -> LiveResult<(String, String)> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|e| LiveError::MalformedCursor(format!("{cursor:?} is not base64: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| LiveError::MalformedCursor(format!("{cursor:?} is not UTF-8")))?;

    match text.split_once(SEPARATOR) {
        Some((type_name, raw_id)) if !type_name.is_empty() => {
            Ok((type_name.to_string(), raw_id.to_string()))
        }
        Some(_) => Err(LiveError::MalformedCursor(format!(
            "{cursor:?} has an empty type name"
        ))),
        None => Err(LiveError::MalformedCursor(format!(
            "{cursor:?} has no type separator"
        ))),
    }
}

/// Decode a cursor and require it to carry `expected_type`.
pub fn decode_typed(cursor: &str, expected_type: &str) -> LiveResult<String> {
    let (type_name, raw_id) = decode_global_id(cursor)?;
    if type_name != expected_type {
        return Err(LiveError::MalformedCursor(format!(
            "expected a {expected_type} cursor, got {type_name}"
        )));
    }
    Ok(raw_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode_global_id("User", "42");
        let b = encode_global_id("User", "42");
        assert_eq!(a, b);
        assert_eq!(a, "VXNlcjo0Mg==");
    }

    #[test]
    fn test_round_trip_post() {
        let cursor = encode_global_id("Post", "7");
        let (type_name, raw_id) = decode_global_id(&cursor).unwrap();
        assert_eq!(type_name, "Post");
        assert_eq!(raw_id, "7");
    }

    #[test]
    fn test_round_trip_various_ids() {
        let cases = [
            ("arrayconnection", "0"),
            ("User", ""),
            ("Comment", "a:b:c"),
            ("Émoji", "🦀 id with spaces"),
        ];
        for (t, id) in cases {
            let decoded = decode_global_id(&encode_global_id(t, id)).unwrap();
            assert_eq!(decoded, (t.to_string(), id.to_string()), "case {t}/{id}");
        }
    }

    #[test]
    fn test_distinct_pairs_encode_differently() {
        assert_ne!(encode_global_id("User", "1"), encode_global_id("User", "2"));
        assert_ne!(encode_global_id("User", "1"), encode_global_id("Post", "1"));
    }

    #[test]
    fn test_decode_rejects_unrelated_string() {
        let err = decode_global_id("definitely not a cursor!").unwrap_err();
        assert!(matches!(err, LiveError::MalformedCursor(_)));
    }

    #[test]
    fn test_decode_rejects_missing_separator() {
        let cursor = STANDARD.encode("nocolon");
        assert!(matches!(
            decode_global_id(&cursor),
            Err(LiveError::MalformedCursor(_))
        ));
    }

    #[test]
    fn test_decode_rejects_empty_type() {
        let cursor = STANDARD.encode(":42");
        assert!(matches!(
            decode_global_id(&cursor),
            Err(LiveError::MalformedCursor(_))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let cursor = STANDARD.encode([0xff, 0xfe, b':', b'1']);
        assert!(matches!(
            decode_global_id(&cursor),
            Err(LiveError::MalformedCursor(_))
        ));
    }

    #[test]
    fn test_decode_typed_checks_type() {
        let cursor = encode_global_id("arrayconnection", "3");
        assert_eq!(decode_typed(&cursor, "arrayconnection").unwrap(), "3");
        assert!(matches!(
            decode_typed(&cursor, "User"),
            Err(LiveError::MalformedCursor(_))
        ));
    }

    #[test]
    fn test_decode_rejects_surrounding_whitespace() {
        let cursor = encode_global_id("Post", "7");
        for padded in [format!(" {cursor}"), format!("{cursor}\n"), format!("\t{cursor} ")] {
            assert!(
                matches!(decode_global_id(&padded), Err(LiveError::MalformedCursor(_))),
                "accepted {padded:?}"
            );
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "cursor separator")]
    fn test_encode_rejects_separator_in_type_name() {
        encode_global_id("a:b", "c");
    }

    proptest! {
        #[test]
        fn prop_round_trip(type_name in "[^:]{1,24}", raw_id in any::<String>()) {
            let cursor = encode_global_id(&type_name, &raw_id);
            prop_assert_eq!(decode_global_id(&cursor).unwrap(), (type_name, raw_id));
        }

        #[test]
        fn prop_encode_is_deterministic(type_name in "[^:]{1,24}", raw_id in any::<String>()) {
            prop_assert_eq!(
                encode_global_id(&type_name, &raw_id),
                encode_global_id(&type_name, &raw_id)
            );
        }

        #[test]
        fn prop_distinct_pairs_give_distinct_cursors(
            a in ("[^:]{1,12}", any::<String>()),
            b in ("[^:]{1,12}", any::<String>()),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(encode_global_id(&a.0, &a.1), encode_global_id(&b.0, &b.1));
        }
    }
}
