use authcode_login::DecodedJwt;
use authcode_login::FlowOutcome;
use authcode_login::TokenDecodeError;
use serde_json::Value;
use serde_json::json;

const UNVERIFIED_NOTE: &str = "decoded without signature verification; do not trust these claims";

pub(crate) fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn decoded_jwt_json(decoded: &DecodedJwt) -> Value {
    json!({
        "header": decoded.header,
        "claims": decoded.claims,
        "signature": decoded.signature,
        "expiresAt": decoded.expires_at(),
        "issuedAt": decoded.issued_at(),
        "note": UNVERIFIED_NOTE,
    })
}

pub(crate) fn print_outcome(outcome: &FlowOutcome) {
    println!("{}", render_outcome(outcome));
}

fn render_outcome(outcome: &FlowOutcome) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Authorization code: {}", outcome.code));

    let tokens = &outcome.tokens;
    lines.push(String::new());
    lines.push("Tokens:".to_string());
    lines.push(format!("  accessToken:  {}", tokens.access_token));
    if let Some(id_token) = &tokens.id_token {
        lines.push(format!("  idToken:      {id_token}"));
    }
    if let Some(refresh_token) = &tokens.refresh_token {
        lines.push(format!("  refreshToken: {refresh_token}"));
    }
    if let Some(token_type) = &tokens.token_type {
        lines.push(format!("  tokenType:    {}", display_value(token_type)));
    }
    if let Some(expires_in) = &tokens.expires_in {
        match tokens.expires_in_secs() {
            Some(secs) => lines.push(format!("  expiresIn:    {secs}s")),
            None => lines.push(format!("  expiresIn:    {}", display_value(expires_in))),
        }
    }

    if let Some(profile) = &outcome.profile {
        lines.push(String::new());
        lines.push("Profile:".to_string());
        for (key, value) in profile.attributes() {
            lines.push(format!("  {key}: {}", display_value(value)));
        }
    }

    lines.push(String::new());
    lines.push(format!("Decoded tokens ({UNVERIFIED_NOTE}):"));
    render_decoded(&mut lines, "accessToken", Some(&outcome.decoded.access_token));
    render_decoded(&mut lines, "idToken", outcome.decoded.id_token.as_ref());
    render_decoded(&mut lines, "refreshToken", outcome.decoded.refresh_token.as_ref());

    lines.join("\n")
}

fn render_decoded(
    lines: &mut Vec<String>,
    name: &str,
    decoded: Option<&Result<DecodedJwt, TokenDecodeError>>,
) {
    match decoded {
        None => {}
        Some(Ok(jwt)) => {
            lines.push(format!("  {name}:"));
            lines.push(format!("    header: {}", Value::Object(jwt.header.clone())));
            lines.push(format!("    claims: {}", Value::Object(jwt.claims.clone())));
            if let Some(expires_at) = jwt.expires_at() {
                lines.push(format!("    expires: {}", expires_at.to_rfc3339()));
            }
        }
        Some(Err(e)) => lines.push(format!("  {name}: not decodable ({e})")),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use authcode_login::DecodedTokens;
    use authcode_login::TokenSet;
    use authcode_login::UserProfile;
    use pretty_assertions::assert_eq;

    fn outcome() -> FlowOutcome {
        let tokens: TokenSet = serde_json::from_value(json!({
            "accessToken": "tok1",
            "refreshToken": "ref1",
            "expiresIn": 3600
        }))
        .unwrap();
        let decoded = DecodedTokens::from_tokens(&tokens);
        let profile: UserProfile =
            serde_json::from_value(json!({ "email": "alice@example.com", "emailVerified": true }))
                .unwrap();
        FlowOutcome {
            code: "ABC123".to_string(),
            tokens,
            profile: Some(profile),
            decoded,
        }
    }

    #[test]
    fn human_output_lists_every_section() {
        let rendered = render_outcome(&outcome());
        assert!(rendered.starts_with("Authorization code: ABC123\n"));
        assert!(rendered.contains("  refreshToken: ref1"));
        assert!(rendered.contains("  expiresIn:    3600s"));
        assert!(rendered.contains("  email: alice@example.com"));
        assert!(rendered.contains("  emailVerified: true"));
        assert!(rendered.contains("  accessToken: not decodable"));
        assert!(rendered.contains(UNVERIFIED_NOTE));
        assert!(!rendered.contains("idToken"));
    }

    #[test]
    fn string_expiry_renders_as_seconds() {
        let mut outcome = outcome();
        outcome.tokens.expires_in = Some(json!("3600"));
        outcome.tokens.token_type = Some(json!("Bearer"));
        let rendered = render_outcome(&outcome);
        assert!(rendered.contains("  expiresIn:    3600s"));
        assert!(rendered.contains("  tokenType:    Bearer"));
    }

    #[test]
    fn decoded_jwt_json_includes_timestamps() {
        let decoded = DecodedJwt {
            header: serde_json::from_value(json!({ "alg": "none" })).unwrap(),
            claims: serde_json::from_value(json!({ "exp": 0 })).unwrap(),
            signature: String::new(),
        };
        let value = decoded_jwt_json(&decoded);
        assert_eq!(value["expiresAt"], json!("1970-01-01T00:00:00Z"));
        assert_eq!(value["issuedAt"], Value::Null);
    }
}
