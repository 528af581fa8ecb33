//! JSON codec for controller snapshots.
//!
//! Wire format: one WebSocket message carries exactly one JSON object as
//! described in [`crate::domain::snapshot`].  There is no extra framing,
//! version byte, or envelope.
//!
//! Decoding is all-or-nothing.  A document with a missing or mistyped field
//! produces a [`SnapshotError`] and no partial [`InputSnapshot`].

use serde_json::error::Category;
use thiserror::Error;

use crate::domain::snapshot::InputSnapshot;

/// Errors that can occur while decoding or encoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The message bytes are not UTF-8 text.
    #[error("snapshot is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// The message is not well-formed JSON (syntax error or truncated input).
    #[error("snapshot is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The JSON is well-formed but a required field is missing or has the
    /// wrong type.
    #[error("snapshot has the wrong shape: {0}")]
    Shape(#[source] serde_json::Error),

    /// Serialization failed (only reachable when encoding).
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            Category::Data => SnapshotError::Shape(e),
            Category::Syntax | Category::Eof | Category::Io => SnapshotError::Syntax(e),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one snapshot from a text message.
///
/// # Errors
///
/// Returns [`SnapshotError::Syntax`] for malformed JSON and
/// [`SnapshotError::Shape`] when a required field is missing or mistyped.
///
/// # Examples
///
/// ```rust
/// use vpad_core::decode_snapshot;
///
/// let text = r#"{"leftStick":{"x":0.5,"y":0},"rightStick":{"x":0,"y":0},
///               "L1":true,"R1":false,"L2":false,"R2":true,
///               "faceButtons":["a"],"DPadButtons":[]}"#;
/// let snap = decode_snapshot(text).unwrap();
/// assert!(snap.l1);
/// assert_eq!(snap.face_buttons, vec!["a".to_string()]);
/// ```
pub fn decode_snapshot(text: &str) -> Result<InputSnapshot, SnapshotError> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes one snapshot from a binary message carrying UTF-8 JSON.
///
/// # Errors
///
/// Returns [`SnapshotError::NotUtf8`] if `bytes` is not UTF-8, otherwise the
/// same errors as [`decode_snapshot`].
pub fn decode_snapshot_bytes(bytes: &[u8]) -> Result<InputSnapshot, SnapshotError> {
    let text = std::str::from_utf8(bytes)?;
    decode_snapshot(text)
}

/// Encodes a snapshot into the JSON text the browser UI would send.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialization fails.
pub fn encode_snapshot(snapshot: &InputSnapshot) -> Result<String, SnapshotError> {
    serde_json::to_string(snapshot).map_err(SnapshotError::Encode)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::StickVector;
    use serde_json::json;

    const FULL: &str = r#"{
        "playerID": 1,
        "leftStick": {"x": 0.25, "y": -0.5},
        "rightStick": {"x": 0, "y": 1},
        "L1": true, "R1": false, "L2": false, "R2": true,
        "faceButtons": ["a", "b"],
        "DPadButtons": ["up"]
    }"#;

    #[test]
    fn test_decode_full_snapshot() {
        // Act
        let snap = decode_snapshot(FULL).unwrap();

        // Assert
        assert_eq!(snap.player_id, Some(json!(1)));
        assert_eq!(snap.left_stick, StickVector::new(0.25, -0.5));
        assert_eq!(snap.right_stick, StickVector::new(0.0, 1.0));
        assert!(snap.l1);
        assert!(!snap.r1);
        assert!(snap.r2);
        assert_eq!(snap.face_buttons, vec!["a", "b"]);
        assert_eq!(snap.dpad_buttons, vec!["up"]);
    }

    #[test]
    fn test_decode_without_player_id_succeeds() {
        let text = r#"{"leftStick":{"x":0,"y":0},"rightStick":{"x":0,"y":0},
            "L1":false,"R1":false,"L2":false,"R2":false,"faceButtons":[],"DPadButtons":[]}"#;
        let snap = decode_snapshot(text).unwrap();
        assert_eq!(snap.player_id, None);
    }

    fn with_player_id(raw: &str) -> String {
        format!(
            r#"{{"playerID":{raw},"leftStick":{{"x":0,"y":0}},"rightStick":{{"x":0,"y":0}},
            "L1":false,"R1":false,"L2":false,"R2":false,"faceButtons":["x"],"DPadButtons":[]}}"#
        )
    }

    #[test]
    fn test_decode_accepts_any_player_id_type() {
        for (raw, expected) in [
            (r#""p1""#, json!("p1")),
            ("-1", json!(-1)),
            ("1.5", json!(1.5)),
            ("{\"seat\":2}", json!({"seat": 2})),
        ] {
            // Act
            let snap = decode_snapshot(&with_player_id(raw))
                .unwrap_or_else(|e| panic!("playerID {raw} rejected: {e}"));

            // Assert: the frame itself is intact.
            assert_eq!(snap.player_id, Some(expected));
            assert_eq!(snap.face_buttons, vec!["x"]);
        }
    }

    #[test]
    fn test_decode_null_player_id_is_absent() {
        let snap = decode_snapshot(&with_player_id("null")).unwrap();
        assert_eq!(snap.player_id, None);
    }

    #[test]
    fn test_string_player_id_is_reencoded_verbatim() {
        let snap = decode_snapshot(&with_player_id(r#""p1""#)).unwrap();

        let text = encode_snapshot(&snap).unwrap();

        assert!(text.contains(r#""playerID":"p1""#));
    }

    #[test]
    fn test_decode_ignores_unknown_extra_fields() {
        let text = r#"{"leftStick":{"x":0,"y":0},"rightStick":{"x":0,"y":0},
            "L1":false,"R1":false,"L2":false,"R2":false,"faceButtons":[],"DPadButtons":[],
            "battery":87}"#;
        assert!(decode_snapshot(text).is_ok());
    }

    #[test]
    fn test_decode_missing_right_stick_is_shape_error() {
        let text = r#"{"leftStick":{"x":0,"y":0},
            "L1":false,"R1":false,"L2":false,"R2":false,"faceButtons":[],"DPadButtons":[]}"#;
        let err = decode_snapshot(text).unwrap_err();
        assert!(matches!(err, SnapshotError::Shape(_)), "got {err:?}");
        assert!(err.to_string().contains("rightStick"));
    }

    #[test]
    fn test_decode_wrong_type_is_shape_error() {
        // L1 must be a boolean.
        let text = r#"{"leftStick":{"x":0,"y":0},"rightStick":{"x":0,"y":0},
            "L1":"yes","R1":false,"L2":false,"R2":false,"faceButtons":[],"DPadButtons":[]}"#;
        assert!(matches!(decode_snapshot(text), Err(SnapshotError::Shape(_))));
    }

    #[test]
    fn test_decode_non_string_identifier_is_shape_error() {
        let text = r#"{"leftStick":{"x":0,"y":0},"rightStick":{"x":0,"y":0},
            "L1":false,"R1":false,"L2":false,"R2":false,"faceButtons":[1],"DPadButtons":[]}"#;
        assert!(matches!(decode_snapshot(text), Err(SnapshotError::Shape(_))));
    }

    #[test]
    fn test_decode_truncated_json_is_syntax_error() {
        let err = decode_snapshot(r#"{"leftStick":{"x":0"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Syntax(_)));
    }

    #[test]
    fn test_decode_garbage_is_syntax_error() {
        assert!(matches!(decode_snapshot("not json"), Err(SnapshotError::Syntax(_))));
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        let err = decode_snapshot_bytes(&[0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(err, SnapshotError::NotUtf8(_)));
    }

    #[test]
    fn test_decode_bytes_accepts_utf8_json() {
        let snap = decode_snapshot_bytes(FULL.as_bytes()).unwrap();
        assert_eq!(snap.player_id, Some(json!(1)));
    }

    #[test]
    fn test_encode_uses_ui_field_names() {
        // Arrange
        let mut snap = InputSnapshot::neutral();
        snap.l2 = true;
        snap.dpad_buttons = vec!["down".to_string()];

        // Act
        let text = encode_snapshot(&snap).unwrap();

        // Assert: the JSON keys match what the browser sends.
        assert!(text.contains(r#""L2":true"#));
        assert!(text.contains(r#""DPadButtons":["down"]"#));
        assert!(text.contains(r#""leftStick""#));
        assert!(!text.contains("playerID"), "absent player id is not serialized");
        assert_eq!(decode_snapshot(&text).unwrap(), snap);
    }
}
