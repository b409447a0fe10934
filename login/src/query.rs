use std::collections::HashMap;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeExtractionError {
    #[error("redirect is not a valid URI: {0}")]
    InvalidUri(String),

    #[error("redirect has no query string")]
    MissingQuery,

    #[error("redirect query has no 'code' parameter")]
    MissingCode,

    #[error("redirect query has an empty 'code' parameter")]
    EmptyCode,

    #[error("redirect query is not valid percent-encoded UTF-8: {0}")]
    InvalidEncoding(String),
}

/// Split a query string into percent-decoded pairs.
///
/// A leading `?` is ignored, empty pairs are skipped, a pair without `=`
/// maps to the empty string and a repeated key keeps its last value. Only
/// `%XX` escapes are decoded; `+` stays a literal plus.
pub fn parse_query(query: &str) -> Result<HashMap<String, String>, CodeExtractionError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut pairs = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        pairs.insert(decode_component(key)?, decode_component(value)?);
    }
    Ok(pairs)
}

fn decode_component(raw: &str) -> Result<String, CodeExtractionError> {
    urlencoding::decode(raw)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| CodeExtractionError::InvalidEncoding(e.to_string()))
}

/// Pull the `code` parameter out of a captured redirect URI.
pub fn extract_code(uri: &str) -> Result<String, CodeExtractionError> {
    let url = Url::parse(uri).map_err(|e| CodeExtractionError::InvalidUri(e.to_string()))?;
    let query = url.query().ok_or(CodeExtractionError::MissingQuery)?;
    let mut params = parse_query(query)?;
    match params.remove("code") {
        Some(code) if !code.is_empty() => Ok(code),
        Some(_) => Err(CodeExtractionError::EmptyCode),
        None => Err(CodeExtractionError::MissingCode),
    }
}
