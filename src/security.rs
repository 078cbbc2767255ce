use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;

/// Hardening headers added to every response.
pub fn secure_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-XSS-Protection", "1; mode=block"))
        .add(("X-Frame-Options", "deny"))
        .add(("Content-Security-Policy", "default-src 'self'"))
        .add(("Referrer-Policy", "no-referrer"))
}

/// CORS policy: same-origin only unless an origin is configured.
pub fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600),
        None => Cors::default(),
    }
}
