use axum::http::{HeaderName, HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Parse a comma-separated `CORS_ALLOWED_ORIGIN` value into header values.
///
/// Blank entries are skipped; an empty list is an error.
pub fn parse_allowed_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(origins)
}

/// Creates a CORS layer for the storefront and admin frontends.
///
/// - Methods: GET, POST, PUT, DELETE, PATCH, OPTIONS
/// - Headers: Content-Type, Authorization, Accept, Cookie
/// - Credentials allowed, 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Build the CORS layer from the `CORS_ALLOWED_ORIGIN` environment variable
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    let raw = std::env::var("CORS_ALLOWED_ORIGIN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN environment variable is required. Example: CORS_ALLOWED_ORIGIN=http://localhost:3000,https://admin.example.com",
        )
    })?;

    let origins = parse_allowed_origins(&raw)?;
    tracing::info!("CORS configured with allowed origins: {}", raw);
    Ok(create_cors_layer(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins_splits_and_trims() {
        let origins =
            parse_allowed_origins(" http://localhost:3000 , https://admin.example.com,").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://localhost:3000");
        assert_eq!(origins[1], "https://admin.example.com");
    }

    #[test]
    fn test_parse_allowed_origins_rejects_empty() {
        assert!(parse_allowed_origins(" , ").is_err());
    }

    #[test]
    fn test_cors_layer_from_env_requires_variable() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            let err = cors_layer_from_env().unwrap_err();
            assert!(err.to_string().contains("CORS_ALLOWED_ORIGIN"));
        });
    }

    #[test]
    fn test_cors_layer_from_env_accepts_list() {
        temp_env::with_var(
            "CORS_ALLOWED_ORIGIN",
            Some("http://localhost:5173"),
            || assert!(cors_layer_from_env().is_ok()),
        );
    }
}
