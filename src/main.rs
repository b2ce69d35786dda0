use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use timeshare_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::StripeService,
    handlers,
    middlewares::{create_cors, AuthMiddleware},
    plans::PlanCatalog,
    services::*,
    swagger::swagger_config,
    utils::jwt::JwtService,
};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let catalog = PlanCatalog::builtin();
    let stripe_service = StripeService::new(config.stripe.clone());

    let user_service = UserService::new(pool.clone(), jwt_service.clone(), catalog.clone());
    let listing_service = ListingService::new(pool.clone(), catalog.clone());
    let listing_query_service = ListingQueryService::new(pool.clone());
    let favorite_service = FavoriteService::new(pool.clone());
    let membership_service = MembershipService::new(pool.clone(), catalog.clone());

    // hourly sweep for memberships whose period lapsed without a renewal
    {
        let membership_service = membership_service.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = membership_service.expire_lapsed().await {
                    log::error!("Membership expiry sweep failed: {:?}", e);
                }
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
        });
    }

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(catalog.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(listing_service.clone()))
            .app_data(web::Data::new(listing_query_service.clone()))
            .app_data(web::Data::new(favorite_service.clone()))
            .app_data(web::Data::new(membership_service.clone()))
            .app_data(web::Data::new(stripe_service.clone()))
            .route("/health", web::get().to(health))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::plan_config)
                    .configure(handlers::listing_config)
                    .configure(handlers::favorite_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
