use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes and validates an access token. Refresh tokens are refused.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("Access token required".to_string());
    }
    Ok(claims)
}

#[cfg(test)]
pub fn generate_access_token(
    user_id: u64,
    username: &str,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl_secs: i64,
) -> String {
    issue(user_id, username, role, employee_id, secret, ttl_secs, TokenType::Access)
}

#[cfg(test)]
fn issue(
    user_id: u64,
    username: &str,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl_secs: i64,
    token_type: TokenType,
) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    let claims = Claims {
        user_id,
        sub: username.to_string(),
        role,
        exp: (chrono::Utc::now().timestamp() + ttl_secs) as usize,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
