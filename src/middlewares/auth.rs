use crate::error::AppError;
use crate::utils::jwt::JwtService;
use actix_web::http::Method;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

/// Route classification for the marketplace: browsing is anonymous, the
/// owner dashboard and favorites are not.
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // GET-only public prefixes (writes under them still need a token)
    read_only_prefixes: Vec<&'static str>,
    // authenticated even when a public prefix would match
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/health",
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
            ],
            prefix_paths: vec![
                "/swagger-ui/",
                "/api-docs/",
                "/api/v1/auth/",
                "/api/v1/plans",
                "/webhook/",
            ],
            read_only_prefixes: vec!["/api/v1/listings"],
            excluded_paths: vec!["/api/v1/listings/my"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        if self.exact_paths.contains(&path) {
            return true;
        }

        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        if method == Method::GET
            && self
                .read_only_prefixes
                .iter()
                .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        // anonymous visitors may send inquiries on a listing
        method == Method::POST
            && path.starts_with("/api/v1/listings/")
            && path.ends_with("/inquiry")
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight never carries credentials
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let auth_header = req.headers().get("Authorization");
        let token = if let Some(auth_value) = auth_header {
            if let Ok(auth_str) = auth_value.to_str() {
                auth_str.strip_prefix("Bearer ").map(|t| t.to_string())
            } else {
                None
            }
        } else {
            None
        };

        if self.public_paths.is_public(req.method(), req.path()) {
            // best effort on public routes so e.g. an owner browsing their
            // own deactivated listing is still recognized
            if let Some(token) = token {
                if let Ok(claims) = self.jwt_service.verify_access_token(&token) {
                    if let Ok(user_id) = claims.user_id() {
                        req.extensions_mut().insert(user_id);
                    }
                }
            }
            return Box::pin(self.service.call(req));
        }

        if let Some(token) = token {
            match self.jwt_service.verify_access_token(&token) {
                Ok(claims) => match claims.user_id() {
                    Ok(user_id) => {
                        req.extensions_mut().insert(user_id);
                        Box::pin(self.service.call(req))
                    }
                    Err(error) => Box::pin(async move { Err(error.into()) }),
                },
                Err(_) => {
                    let error = AppError::AuthError("Invalid access token".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            }
        } else {
            let error = AppError::AuthError("Missing access token".to_string());
            Box::pin(async move { Err(error.into()) })
        }
    }
}

/// Current authenticated user, as placed into request extensions by the
/// middleware.
pub fn current_user_id(req: &HttpRequest) -> Result<i64, AppError> {
    req.extensions()
        .get::<i64>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
}

/// Like [`current_user_id`] but for public routes where a token is optional.
pub fn optional_user_id(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_path_classification() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::POST, "/api/v1/auth/login"));
        assert!(paths.is_public(&Method::GET, "/api/v1/plans"));
        assert!(paths.is_public(&Method::GET, "/api/v1/listings"));
        assert!(paths.is_public(&Method::GET, "/api/v1/listings/42"));
        assert!(paths.is_public(&Method::POST, "/api/v1/listings/42/inquiry"));
        assert!(paths.is_public(&Method::POST, "/webhook/stripe"));

        assert!(!paths.is_public(&Method::POST, "/api/v1/listings"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/listings/my"));
        assert!(!paths.is_public(&Method::DELETE, "/api/v1/listings/42"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/favorites"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/users/me"));
    }
}
