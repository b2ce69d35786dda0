use crate::models::plan::{PlanComparisonResponse, PlanTierResponse};
use crate::models::ApiResponse;
use crate::plans::PlanCatalog;
use actix_web::{web, HttpResponse, Result};

#[utoipa::path(
    get,
    path = "/api/v1/plans",
    tag = "plans",
    responses(
        (status = 200, description = "Available subscription tiers in ascending price order")
    )
)]
pub async fn list_plans(catalog: web::Data<PlanCatalog>) -> Result<HttpResponse> {
    let tiers: Vec<PlanTierResponse> = catalog.all_tiers().iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(tiers)))
}

#[utoipa::path(
    get,
    path = "/api/v1/plans/compare",
    tag = "plans",
    responses(
        (status = 200, description = "Side-by-side tier matrix", body = PlanComparisonResponse)
    )
)]
pub async fn compare_plans(catalog: web::Data<PlanCatalog>) -> Result<HttpResponse> {
    let comparison = PlanComparisonResponse::from_catalog(catalog.get_ref());
    Ok(HttpResponse::Ok().json(ApiResponse::success(comparison)))
}

pub fn plan_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/plans")
            .route("", web::get().to(list_plans))
            .route("/compare", web::get().to(compare_plans)),
    );
}
