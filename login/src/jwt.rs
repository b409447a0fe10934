//! Unverified JWT decoding.
//!
//! **No signature, issuer, audience or expiry checks are performed.** The
//! decoded header and claims are for display and debugging only; nothing here
//! may be used to decide whether a token is trustworthy.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Which part of the token a decode error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Payload,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Header => f.write_str("header"),
            Segment::Payload => f.write_str("payload"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("token is empty")]
    Empty,

    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("{0} segment is empty")]
    EmptySegment(Segment),

    #[error("{segment} segment is not valid base64url: {source}")]
    Base64 {
        segment: Segment,
        source: base64::DecodeError,
    },

    #[error("{segment} segment is not valid JSON: {source}")]
    Json {
        segment: Segment,
        source: serde_json::Error,
    },

    #[error("{segment} segment is not a JSON object")]
    NotAnObject { segment: Segment },
}

/// Header and claims of a token, decoded without verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedJwt {
    pub header: Map<String, Value>,
    pub claims: Map<String, Value>,
    /// Raw base64url signature segment, never checked.
    pub signature: String,
}

impl DecodedJwt {
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// `exp` as a timestamp, if present and numeric.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim("exp")
    }

    /// `iat` as a timestamp, if present and numeric.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim("iat")
    }

    fn timestamp_claim(&self, name: &str) -> Option<DateTime<Utc>> {
        let seconds = self.claims.get(name)?.as_i64()?;
        DateTime::from_timestamp(seconds, 0)
    }
}

/// Decode a compact-serialized JWT without verifying it.
///
/// The token must have exactly three segments with a non-empty header and
/// payload. Trailing `=` padding on either segment is tolerated. An empty
/// signature (as in `alg: none` tokens) is accepted.
pub fn decode_jwt(token: &str) -> Result<DecodedJwt, TokenDecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenDecodeError::Empty);
    }

    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature] = parts.as_slice() else {
        return Err(TokenDecodeError::SegmentCount(parts.len()));
    };

    Ok(DecodedJwt {
        header: decode_segment(header_b64, Segment::Header)?,
        claims: decode_segment(payload_b64, Segment::Payload)?,
        signature: (*signature).to_string(),
    })
}

fn decode_segment(raw: &str, segment: Segment) -> Result<Map<String, Value>, TokenDecodeError> {
    let raw = raw.trim_end_matches('=');
    if raw.is_empty() {
        return Err(TokenDecodeError::EmptySegment(segment));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|source| TokenDecodeError::Base64 { segment, source })?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(TokenDecodeError::NotAnObject { segment }),
        Err(source) => Err(TokenDecodeError::Json { segment, source }),
    }
}
