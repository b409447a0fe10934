use crate::casing::camelize_keys;
use crate::casing::camelize_map;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Response of the token endpoint with keys normalized to camelCase.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    /// This is a JWT.
    pub access_token: String,

    /// Opaque for Cognito; other providers may issue a JWT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Only present when the `openid` scope was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Kept as returned; see [`TokenSet::token_type_str`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<Value>,

    /// Kept as returned. Some providers send a number, others a numeric
    /// string; see [`TokenSet::expires_in_secs`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Value>,

    /// Any other fields the provider returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenSet {
    /// Camel-case the raw response keys, then read the well-known fields.
    pub(crate) fn from_response(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(camelize_keys(body))
    }

    pub fn token_type_str(&self) -> Option<&str> {
        self.token_type.as_ref().and_then(Value::as_str)
    }

    /// Lifetime in seconds, from either a JSON number or a numeric string.
    pub fn expires_in_secs(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Attributes returned by the userinfo endpoint, keys in camelCase.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct UserProfile(pub Map<String, Value>);

impl UserProfile {
    pub(crate) fn from_response(body: Value) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_value(body)?;
        Ok(Self(camelize_map(map)))
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }
}
