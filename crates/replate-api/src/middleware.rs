use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use replate_types::api::Claims;

use crate::auth::AppState;

/// Extract and validate JWT from Authorization header. The secret comes from
/// shared state, configured once at startup.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = decode_token(&state.jwt_secret, token).ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    fn token_for(secret: &str, exp: usize) -> (Claims, String) {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "ngo@example.org".to_string(),
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (claims, token)
    }

    fn future_exp() -> usize {
        (chrono::Utc::now() + chrono::Duration::days(1)).timestamp() as usize
    }

    #[test]
    fn decodes_with_the_configured_secret_only() {
        let (claims, token) = token_for("state-secret", future_exp());

        let decoded = decode_token("state-secret", &token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, claims.email);

        assert!(decode_token("some-other-secret", &token).is_none());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let exp = (chrono::Utc::now() - chrono::Duration::days(1)).timestamp() as usize;
        let (_, token) = token_for("state-secret", exp);
        assert!(decode_token("state-secret", &token).is_none());
    }
}
