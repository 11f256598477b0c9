use jsonwebtoken::{decode, Algorithm, TokenData, Validation};

use super::{claims::IdClaims, jwks::JwksCache};

/// Validate an RS256 ID token against the provider's published keys.
/// Issuer, audience and expiry are all enforced; the claims come back only
/// when every check passes.
pub async fn validate_jwt(
    token: &str,
    jwks_cache: &JwksCache,
    expected_issuer: &str,
    expected_audience: &str,
) -> Result<IdClaims, String> {
    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| format!("Failed to decode JWT header: {}", e))?;
    let kid = header.kid.ok_or("Missing kid in JWT header")?;

    let decoding_key = jwks_cache.get_decoding_key(&kid).await?;
    let validation = token_validation(expected_issuer, expected_audience);

    let data: TokenData<IdClaims> = decode(token, &decoding_key, &validation)
        .map_err(|e| format!("JWT validation failed: {}", e))?;

    Ok(data.claims)
}

fn token_validation(issuer: &str, audience: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    validation.validate_exp = true;
    validation
}
