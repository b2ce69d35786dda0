use rust_decimal::Decimal;

/// One subscription tier. Prices are display/reference values only;
/// actual billing belongs to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTier {
    pub id: &'static str,
    pub display_name: &'static str,
    pub monthly_price: Decimal,
    /// `None` means unlimited.
    pub max_listings: Option<u32>,
    pub max_photos_per_listing: u32,
    pub features: &'static [&'static str],
}

impl PlanTier {
    pub fn is_unlimited(&self) -> bool {
        self.max_listings.is_none()
    }
}

/// Immutable tier table, constructed once at startup and shared by
/// reference. Unknown or legacy tier identifiers resolve to the default
/// (lowest) tier.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    tiers: Vec<PlanTier>,
}

/// Identifiers from before the `*_monthly` naming, kept resolvable.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("starter", "starter_monthly"),
    ("basic", "basic_monthly"),
    ("premium", "premium_monthly"),
    ("unlimited", "unlimited_monthly"),
];

const DEFAULT_TIER_ID: &str = "starter_monthly";

impl PlanCatalog {
    /// The product catalog. Tiers are listed in ascending price order.
    pub fn builtin() -> Self {
        let tiers = vec![
            PlanTier {
                id: "starter_monthly",
                display_name: "Starter",
                monthly_price: Decimal::new(799, 2),
                max_listings: Some(1),
                max_photos_per_listing: 6,
                features: &[
                    "Create 1 listing",
                    "Up to 6 photos per listing",
                    "Basic listing analytics",
                    "Email support",
                ],
            },
            PlanTier {
                id: "basic_monthly",
                display_name: "Basic",
                monthly_price: Decimal::new(1499, 2),
                max_listings: Some(2),
                max_photos_per_listing: 10,
                features: &[
                    "Create 2 listings",
                    "Up to 10 photos per listing",
                    "Advanced listing analytics",
                    "Priority email support",
                    "Featured listing option",
                ],
            },
            PlanTier {
                id: "premium_monthly",
                display_name: "Premium",
                monthly_price: Decimal::new(2499, 2),
                max_listings: Some(5),
                max_photos_per_listing: 20,
                features: &[
                    "Create 5 listings",
                    "Up to 20 photos per listing",
                    "Premium listing analytics",
                    "Phone & email support",
                    "Featured listings included",
                    "Advanced search placement",
                ],
            },
            PlanTier {
                id: "unlimited_monthly",
                display_name: "Unlimited",
                monthly_price: Decimal::new(3999, 2),
                max_listings: None,
                max_photos_per_listing: 30,
                features: &[
                    "Unlimited listings",
                    "Up to 30 photos per listing",
                    "Premium analytics & insights",
                    "Priority phone & email support",
                    "Featured listings included",
                    "Top search placement",
                    "Bulk listing tools",
                    "API access",
                ],
            },
        ];
        Self { tiers }
    }

    pub fn default_tier(&self) -> &PlanTier {
        self.get(DEFAULT_TIER_ID)
            .expect("catalog always contains the default tier")
    }

    fn get(&self, tier_id: &str) -> Option<&PlanTier> {
        self.tiers.iter().find(|t| t.id == tier_id)
    }

    /// Resolves a subscriber's stored tier identifier. Legacy aliases map
    /// to their current tier; anything unrecognized (or absent) falls back
    /// to the default tier.
    pub fn lookup(&self, tier_id: Option<&str>) -> &PlanTier {
        let Some(id) = tier_id else {
            return self.default_tier();
        };
        let id = LEGACY_ALIASES
            .iter()
            .find(|(legacy, _)| *legacy == id)
            .map(|(_, current)| *current)
            .unwrap_or(id);
        self.get(id).unwrap_or_else(|| self.default_tier())
    }

    /// All tiers, sorted by ascending monthly price.
    pub fn all_tiers(&self) -> &[PlanTier] {
        &self.tiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_tier() {
        let catalog = PlanCatalog::builtin();
        let tier = catalog.lookup(Some("premium_monthly"));
        assert_eq!(tier.id, "premium_monthly");
        assert_eq!(tier.display_name, "Premium");
        assert_eq!(tier.max_listings, Some(5));
        assert_eq!(tier.max_photos_per_listing, 20);
    }

    #[test]
    fn test_lookup_unknown_falls_back_to_default() {
        let catalog = PlanCatalog::builtin();
        let tier = catalog.lookup(Some("gold_yearly"));
        assert_eq!(tier.id, "starter_monthly");
        assert_eq!(tier, catalog.default_tier());
    }

    #[test]
    fn test_lookup_none_is_default() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(catalog.lookup(None).id, "starter_monthly");
    }

    #[test]
    fn test_legacy_aliases_resolve() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(catalog.lookup(Some("basic")).id, "basic_monthly");
        assert_eq!(catalog.lookup(Some("premium")).id, "premium_monthly");
    }

    #[test]
    fn test_tiers_sorted_by_ascending_price() {
        let catalog = PlanCatalog::builtin();
        let tiers = catalog.all_tiers();
        assert_eq!(tiers.len(), 4);
        for pair in tiers.windows(2) {
            assert!(pair[0].monthly_price < pair[1].monthly_price);
        }
    }

    #[test]
    fn test_only_unlimited_has_no_listing_cap() {
        let catalog = PlanCatalog::builtin();
        for tier in catalog.all_tiers() {
            assert_eq!(tier.is_unlimited(), tier.id == "unlimited_monthly");
        }
    }
}
