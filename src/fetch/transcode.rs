//! Charset workarounds for the DATEM API.
//!
//! The upstream service emits JSON whose accented characters only come out
//! right after a second pass through an 8-bit codepage, which suggests UTF-8
//! bytes were mis-decoded somewhere upstream and re-emitted. The exact
//! behavior is not documented by the API, so [`correct_double_encoding`]
//! reproduces the observed two-step transcode literally instead of guessing
//! at the "right" encoding. Revisit once the upstream encoding is confirmed.

use chardetng::EncodingDetector;
use encoding_rs::mem::{decode_latin1, encode_latin1_lossy};
use serde_json::Value;

/// Decode a raw response body using its apparent encoding.
///
/// The API does not reliably declare a charset, so the encoding is sniffed
/// from the bytes themselves before decoding to UTF-8.
pub fn decode_response_text(body: &[u8]) -> String {
    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// Run a parsed payload through the corrective Latin-1 round trip.
///
/// The payload is serialized back to a JSON string, that string's code points
/// are reinterpreted as Latin-1 bytes, the bytes are decoded again as
/// ISO-8859-1, and the result is re-parsed. Code points above U+00FF do not
/// survive the reinterpretation; the upstream payloads stay within the
/// Latin-1 range.
pub fn correct_double_encoding(payload: &Value) -> serde_json::Result<Value> {
    let serialized = serde_json::to_string(payload)?;
    let bytes = encode_latin1_lossy(&serialized);
    let corrected = decode_latin1(&bytes);
    serde_json::from_str(&corrected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Captured from a real status lookup: "Liberação autorizada" in
    // ISO-8859-1, as the API serves it.
    const SAMPLE_BODY: &[u8] =
        b"{\"data\":{\"situacao\":\"Libera\xe7\xe3o autorizada\",\"codigo\":7}}";

    #[test]
    fn decodes_latin1_body_to_utf8() {
        let text = decode_response_text(SAMPLE_BODY);
        assert!(text.contains("Liberação autorizada"), "got: {}", text);
    }

    #[test]
    fn decodes_plain_utf8_body_unchanged() {
        let body = r#"{"data":{"situacao":"Liberação autorizada"}}"#;
        assert_eq!(decode_response_text(body.as_bytes()), body);
    }

    #[test]
    fn round_trip_preserves_accented_payload() {
        let payload = json!({
            "situacao": "Liberação autorizada",
            "observacao": "Conhecimento de embarque nº 42",
        });
        let corrected = correct_double_encoding(&payload).unwrap();
        assert_eq!(corrected, payload);
    }

    #[test]
    fn round_trip_preserves_structure_and_numbers() {
        let payload = json!({
            "codigo": 7,
            "liberado": true,
            "itens": [1, 2, 3],
            "detalhe": {"pais": "Brasil"},
        });
        let corrected = correct_double_encoding(&payload).unwrap();
        assert_eq!(corrected, payload);
    }
}
