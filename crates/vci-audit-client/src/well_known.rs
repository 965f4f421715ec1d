//! Well-known issuer endpoint locations.

/// Key set location relative to the issuer URL
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Revocation list directory relative to the issuer URL
pub const CRL_DIR: &str = "/.well-known/crl";

/// Key set URL for an issuer
#[must_use]
pub fn jwks_url(iss: &str) -> String {
    format!("{}{JWKS_PATH}", iss.trim_end_matches('/'))
}

/// Revocation list URL for one of an issuer's keys
#[must_use]
pub fn crl_url(iss: &str, kid: &str) -> String {
    format!("{}{CRL_DIR}/{kid}.json", iss.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwks_url() {
        assert_eq!(
            jwks_url("https://issuer.example/shc"),
            "https://issuer.example/shc/.well-known/jwks.json"
        );
        assert_eq!(
            jwks_url("https://issuer.example/"),
            "https://issuer.example/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_crl_url() {
        assert_eq!(
            crl_url("https://issuer.example", "abc"),
            "https://issuer.example/.well-known/crl/abc.json"
        );
    }
}
