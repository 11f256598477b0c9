use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub allowed_origin: String,
    /// Expected `iss` claim of incoming ID tokens.
    pub auth_issuer: String,
    /// Expected `aud` claim of incoming ID tokens.
    pub auth_audience: String,
    /// JWKS document of the identity provider.
    pub auth_jwks_url: String,
    pub openai_api_key: String,
    pub prompt_model: String,
    pub analysis_model: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let bind_address = env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let allowed_origin = env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let auth_issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER must be set".to_string())?;

        let auth_audience = env::var("AUTH_AUDIENCE")
            .map_err(|_| "AUTH_AUDIENCE must be set".to_string())?;

        // Most OIDC-style providers publish their keys under the issuer;
        // AUTH_JWKS_URL overrides for providers that host them elsewhere.
        let auth_jwks_url = env::var("AUTH_JWKS_URL")
            .unwrap_or_else(|_| default_jwks_url(&auth_issuer));

        let openai_api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| "OPENAI_API_KEY must be set".to_string())?;

        let prompt_model = env::var("PROMPT_MODEL")
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let analysis_model = env::var("ANALYSIS_MODEL")
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Ok(Self {
            database_url,
            bind_address,
            allowed_origin,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            openai_api_key,
            prompt_model,
            analysis_model,
        })
    }
}

fn default_jwks_url(issuer: &str) -> String {
    format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
}
