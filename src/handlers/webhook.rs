use crate::error::{AppError, AppResult};
use crate::external::stripe::StripeService;
use crate::services::MembershipService;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, info, warn};
use rust_decimal::Decimal;
use stripe::{CheckoutSession, Event, EventObject, EventType, Expandable};

/// Entry point for payment gateway notifications. Checkout happens on the
/// storefront; this endpoint is how paid memberships reach the backend.
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    stripe_service: web::Data<StripeService>,
    membership_service: web::Data<MembershipService>,
) -> Result<HttpResponse> {
    let signature = match req.headers().get("stripe-signature") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            warn!("Missing Stripe-Signature header");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing Stripe-Signature header"
            })));
        }
    };

    let payload = std::str::from_utf8(&body).map_err(|_| {
        error!("Invalid UTF-8 in webhook payload");
        actix_web::error::ErrorBadRequest("Invalid payload encoding")
    })?;

    let event = match stripe_service.verify_webhook_signature(payload, signature) {
        Ok(event) => event,
        Err(e) => {
            error!("Webhook signature verification failed: {e}");
            return Ok(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid signature"
            })));
        }
    };

    info!(
        "Received Stripe webhook event: {} ({})",
        event.type_, event.id
    );

    match handle_stripe_event(event, &membership_service).await {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "received": true
        }))),
        Err(e) => {
            error!("Failed to process webhook event: {e}");
            // answer 200 anyway so the gateway does not retry forever
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "received": true,
                "error": format!("Processing failed: {}", e)
            })))
        }
    }
}

async fn handle_stripe_event(
    event: Event,
    membership_service: &MembershipService,
) -> AppResult<()> {
    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                handle_checkout_completed(session, membership_service).await?;
            }
            Ok(())
        }
        EventType::InvoicePaymentSucceeded => {
            // recurring payment on an existing subscription
            if let EventObject::Invoice(invoice) = event.data.object {
                if let Some(sub) = invoice.subscription.as_ref() {
                    let sub_id = expandable_id(sub);
                    membership_service.renew_by_subscription(&sub_id).await?;
                }
            }
            Ok(())
        }
        EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                membership_service
                    .cancel_by_subscription(subscription.id.as_ref())
                    .await?;
            }
            Ok(())
        }
        _ => {
            info!("Unhandled event type: {:?}", event.type_);
            Ok(())
        }
    }
}

/// First checkout for a tier: the storefront puts `user_id` and `tier_id`
/// in the session metadata.
async fn handle_checkout_completed(
    session: CheckoutSession,
    membership_service: &MembershipService,
) -> AppResult<()> {
    let metadata = session.metadata.clone().unwrap_or_default();

    let user_id = metadata
        .get("user_id")
        .cloned()
        .or_else(|| session.client_reference_id.clone())
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| {
            AppError::ValidationError("Missing or invalid user_id in session metadata".to_string())
        })?;

    let tier_id = metadata.get("tier_id").cloned().ok_or_else(|| {
        AppError::ValidationError("Missing tier_id in session metadata".to_string())
    })?;

    let subscription_id = session.subscription.as_ref().map(expandable_id);
    // amounts arrive in cents
    let amount = session.amount_total.map(|cents| Decimal::new(cents, 2));

    membership_service
        .activate(
            user_id,
            &tier_id,
            Some(session.id.to_string()),
            subscription_id,
            amount,
        )
        .await?;

    Ok(())
}

fn expandable_id<T: stripe::Object>(exp: &Expandable<T>) -> String
where
    T::Id: ToString,
{
    match exp {
        Expandable::Id(id) => id.to_string(),
        Expandable::Object(obj) => obj.id().to_string(),
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/stripe", web::post().to(stripe_webhook)));
}
