use crate::models::user::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};
use crate::models::ApiResponse;
use crate::services::UserService;
use actix_web::{web, HttpResponse, ResponseError, Result};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email, username or password"),
        (status = 409, description = "Email or username already registered")
    )
)]
pub async fn register(
    user_service: web::Data<UserService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match user_service.register(request.into_inner()).await {
        Ok(auth) => Ok(HttpResponse::Created().json(ApiResponse::success(auth))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    user_service: web::Data<UserService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match user_service.login(request.into_inner()).await {
        Ok(auth) => Ok(HttpResponse::Ok().json(ApiResponse::success(auth))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued"),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    user_service: web::Data<UserService>,
    request: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    match user_service.refresh(&request.refresh_token).await {
        Ok(tokens) => Ok(HttpResponse::Ok().json(ApiResponse::success(tokens))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh)),
    );
}
