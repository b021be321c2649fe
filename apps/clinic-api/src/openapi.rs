//! OpenAPI documentation configuration

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clinic Commerce API",
        version = "0.1.0",
        description = "Storefront, clinic booking and marketing content over MongoDB",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_accounts::ApiDoc),
        (path = "/api", api = domain_clinics::ApiDoc),
        (path = "/api", api = domain_catalog::ApiDoc),
        (path = "/api", api = domain_orders::ApiDoc),
        (path = "/api", api = domain_content::ApiDoc)
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_prefixed() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/clinics"));
        assert!(doc.paths.paths.contains_key("/api/orders"));
        assert!(doc.paths.paths.contains_key("/api/quizzes"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
