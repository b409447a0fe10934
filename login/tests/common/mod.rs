#![allow(clippy::unwrap_used, dead_code)]

use authcode_login::FlowConfig;

pub fn make_fake_jwt(payload: serde_json::Value) -> String {
    use base64::Engine;
    let header = serde_json::json!({"alg": "RS256", "kid": "test-key"});
    let b64 = |b: &[u8]| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b);
    let header_b64 = b64(&serde_json::to_vec(&header).unwrap());
    let payload_b64 = b64(&serde_json::to_vec(&payload).unwrap());
    let signature_b64 = b64(b"sig");
    format!("{header_b64}.{payload_b64}.{signature_b64}")
}

pub fn test_config() -> FlowConfig {
    FlowConfig::from_lookup(|name| {
        let value = match name {
            "AUTH_DOMAIN" => "auth.example.com",
            "CLIENT_ID" => "client-1",
            "CLIENT_SECRET" => "s3cret",
            "REDIRECT_URI" => "https://app.example.com/callback",
            "USERNAME" => "alice@example.com",
            "PASSWORD" => "hunter2",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}
