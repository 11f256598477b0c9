pub mod claims;
pub mod jwks;
pub mod jwt;

pub use claims::IdClaims;
pub use jwks::JwksCache;
pub use jwt::validate_jwt;
