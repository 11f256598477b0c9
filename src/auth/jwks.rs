use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cached copy of the identity provider's JWKS document.
pub struct JwksCache {
    cache: Cache<String, Arc<JwkSet>>,
    jwks_url: String,
}

impl JwksCache {
    pub fn new(jwks_url: String) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(3600)) // refetch at most hourly
            .build();

        Self { cache, jwks_url }
    }

    async fn get_jwks(&self) -> Result<Arc<JwkSet>, String> {
        if let Some(jwks) = self.cache.get(&self.jwks_url).await {
            return Ok(jwks);
        }

        let jwks = Arc::new(self.fetch_jwks().await?);
        self.cache.insert(self.jwks_url.clone(), jwks.clone()).await;

        Ok(jwks)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, String> {
        tracing::debug!(url = %self.jwks_url, "fetching JWKS document");

        let response = reqwest::get(&self.jwks_url)
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("JWKS endpoint returned {}", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse JWKS: {}", e))
    }

    /// Resolve a token's `kid` to a decoding key. An unknown kid busts the
    /// cached document and refetches once, so tokens signed with a freshly
    /// rotated provider key do not have to wait out the TTL.
    pub async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, String> {
        let jwks = self.get_jwks().await?;
        if let Some(jwk) = find_key(&jwks, kid) {
            return decoding_key(jwk);
        }

        self.cache.invalidate(&self.jwks_url).await;
        let fresh = self.get_jwks().await?;
        match find_key(&fresh, kid) {
            Some(jwk) => decoding_key(jwk),
            None => Err(format!("No key found with kid: {}", kid)),
        }
    }
}

fn find_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}

fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, String> {
    DecodingKey::from_jwk(jwk).map_err(|e| format!("Failed to create decoding key: {}", e))
}
