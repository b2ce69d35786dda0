//! Entitlement evaluation: pure functions deciding whether a subscriber's
//! tier allows another listing or photo set. Callers run these inside the
//! same transaction that read the current count, so concurrent creations
//! cannot both pass on a stale count.

use crate::plans::PlanCatalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl LimitDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// May the subscriber create another listing, given how many listings they
/// currently have in `active` status?
pub fn can_create_listing(
    catalog: &PlanCatalog,
    tier_id: Option<&str>,
    current_active_count: u64,
) -> LimitDecision {
    let tier = catalog.lookup(tier_id);

    let Some(max_listings) = tier.max_listings else {
        return LimitDecision::allow();
    };

    if current_active_count >= u64::from(max_listings) {
        let noun = if max_listings == 1 {
            "listing"
        } else {
            "listings"
        };
        return LimitDecision::deny(format!(
            "Listing limit reached. Your {} plan allows {} active {}.",
            tier.display_name, max_listings, noun
        ));
    }

    LimitDecision::allow()
}

/// May a listing owned by this subscriber carry `requested_photo_count`
/// photos in total?
pub fn can_attach_photos(
    catalog: &PlanCatalog,
    tier_id: Option<&str>,
    requested_photo_count: u32,
) -> LimitDecision {
    let tier = catalog.lookup(tier_id);

    if requested_photo_count > tier.max_photos_per_listing {
        return LimitDecision::deny(format!(
            "Photo limit exceeded. Your {} plan allows up to {} photos per listing.",
            tier.display_name, tier.max_photos_per_listing
        ));
    }

    LimitDecision::allow()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlanCatalog {
        PlanCatalog::builtin()
    }

    #[test]
    fn test_unlimited_tier_always_allows() {
        let c = catalog();
        for count in [0u64, 1, 5, 1_000, u64::MAX] {
            let decision = can_create_listing(&c, Some("unlimited_monthly"), count);
            assert!(decision.allowed, "denied at count {count}");
            assert!(decision.reason.is_none());
        }
    }

    #[test]
    fn test_finite_cap_boundary() {
        let c = catalog();
        // premium caps at 5
        assert!(can_create_listing(&c, Some("premium_monthly"), 4).allowed);
        let denied = can_create_listing(&c, Some("premium_monthly"), 5);
        assert!(!denied.allowed);
        assert!(denied.reason.as_deref().unwrap().contains('5'));
    }

    #[test]
    fn test_cap_of_one_uses_singular() {
        let c = catalog();
        let denied = can_create_listing(&c, Some("starter_monthly"), 1);
        assert_eq!(
            denied.reason.as_deref(),
            Some("Listing limit reached. Your Starter plan allows 1 active listing.")
        );
    }

    #[test]
    fn test_cap_above_one_uses_plural() {
        let c = catalog();
        let denied = can_create_listing(&c, Some("basic_monthly"), 2);
        assert_eq!(
            denied.reason.as_deref(),
            Some("Listing limit reached. Your Basic plan allows 2 active listings.")
        );
    }

    #[test]
    fn test_unknown_tier_gets_default_entitlements() {
        let c = catalog();
        // same outcome as the starter default: one active listing allowed
        assert!(can_create_listing(&c, Some("no_such_tier"), 0).allowed);
        assert!(!can_create_listing(&c, Some("no_such_tier"), 1).allowed);
        assert_eq!(
            can_create_listing(&c, Some("no_such_tier"), 1).reason,
            can_create_listing(&c, Some("starter_monthly"), 1).reason,
        );
    }

    #[test]
    fn test_missing_tier_gets_default_entitlements() {
        let c = catalog();
        assert!(can_create_listing(&c, None, 0).allowed);
        assert!(!can_create_listing(&c, None, 1).allowed);
    }

    #[test]
    fn test_photo_limit_within_cap() {
        let c = catalog();
        assert!(can_attach_photos(&c, Some("starter_monthly"), 6).allowed);
    }

    #[test]
    fn test_photo_limit_exceeded() {
        let c = catalog();
        let denied = can_attach_photos(&c, Some("starter_monthly"), 7);
        assert!(!denied.allowed);
        assert_eq!(
            denied.reason.as_deref(),
            Some("Photo limit exceeded. Your Starter plan allows up to 6 photos per listing.")
        );
    }

    #[test]
    fn test_photo_limit_for_legacy_tier() {
        let c = catalog();
        // "basic" aliases to basic_monthly (10 photos)
        assert!(can_attach_photos(&c, Some("basic"), 10).allowed);
        assert!(!can_attach_photos(&c, Some("basic"), 11).allowed);
    }
}
