//! Session token codec.
//!
//! A session is identified by a high-entropy random nonce stored as raw
//! bytes. Clients carry the nonce as a transport-safe base64 string, the
//! *token*. Both directions are pure transforms with no I/O.
//!
//! Decoding is deliberately infallible at the type level: a malformed token
//! yields `None`, which callers fold into the same "session not found" path
//! as an unknown nonce.
//!
//! # Examples
//!
//! ```
//! use dynstory_common::token::{decode_token, encode_token};
//!
//! let nonce = vec![0x2a; 16];
//! let token = encode_token(&nonce);
//! assert_eq!(decode_token(&token), Some(nonce));
//! assert_eq!(decode_token("not base64!"), None);
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Encode a session nonce into its transport-safe token form.
#[must_use]
pub fn encode_token(nonce: &[u8]) -> String {
    STANDARD.encode(nonce)
}

/// Decode a token back into the nonce bytes.
///
/// Returns `None` for syntactically invalid input so callers can treat a
/// malformed token exactly like a missing session.
#[must_use]
pub fn decode_token(token: &str) -> Option<Vec<u8>> {
    STANDARD.decode(token).ok()
}
