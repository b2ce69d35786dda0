use crate::plans::{PlanCatalog, PlanTier};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanTierResponse {
    #[schema(example = "basic_monthly")]
    pub id: String,
    #[schema(example = "Basic")]
    pub name: String,
    pub monthly_price: Decimal,
    /// `null` means unlimited.
    pub max_listings: Option<u32>,
    pub max_photos_per_listing: u32,
    pub features: Vec<String>,
}

impl From<&PlanTier> for PlanTierResponse {
    fn from(tier: &PlanTier) -> Self {
        Self {
            id: tier.id.to_string(),
            name: tier.display_name.to_string(),
            monthly_price: tier.monthly_price,
            max_listings: tier.max_listings,
            max_photos_per_listing: tier.max_photos_per_listing,
            features: tier.features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// One row of the side-by-side feature matrix. `included` is aligned with
/// the `plans` vector of the comparison response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlanComparisonFeature {
    #[schema(example = "API access")]
    pub name: String,
    pub included: Vec<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanComparisonResponse {
    pub plans: Vec<PlanTierResponse>,
    /// Active-listing allowance per plan, e.g. `"2 listings"` or `"Unlimited"`.
    pub listings: Vec<String>,
    /// Photo allowance per plan, e.g. `"10 photos"`.
    pub photos_per_listing: Vec<String>,
    pub features: Vec<PlanComparisonFeature>,
}

impl PlanComparisonResponse {
    pub fn from_catalog(catalog: &PlanCatalog) -> Self {
        let tiers = catalog.all_tiers();

        let listings = tiers
            .iter()
            .map(|t| match t.max_listings {
                None => "Unlimited".to_string(),
                Some(1) => "1 listing".to_string(),
                Some(n) => format!("{n} listings"),
            })
            .collect();
        let photos_per_listing = tiers
            .iter()
            .map(|t| format!("{} photos", t.max_photos_per_listing))
            .collect();

        // every distinct feature string becomes a matrix row, in the order
        // it first appears walking the tiers from cheapest up
        let mut features: Vec<PlanComparisonFeature> = Vec::new();
        for tier in tiers {
            for &feature in tier.features {
                if !features.iter().any(|f| f.name == feature) {
                    features.push(PlanComparisonFeature {
                        name: feature.to_string(),
                        included: tiers
                            .iter()
                            .map(|t| t.features.contains(&feature))
                            .collect(),
                    });
                }
            }
        }

        Self {
            plans: tiers.iter().map(Into::into).collect(),
            listings,
            photos_per_listing,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_matrix_from_builtin_catalog() {
        let comparison = PlanComparisonResponse::from_catalog(&PlanCatalog::builtin());

        assert_eq!(comparison.plans.len(), 4);
        assert_eq!(
            comparison.listings,
            vec!["1 listing", "2 listings", "5 listings", "Unlimited"]
        );
        assert_eq!(
            comparison.photos_per_listing,
            vec!["6 photos", "10 photos", "20 photos", "30 photos"]
        );

        // rows align with the plans vector; API access ships only on the top tier
        let api = comparison
            .features
            .iter()
            .find(|f| f.name == "API access")
            .unwrap();
        assert_eq!(api.included, vec![false, false, false, true]);
        assert!(comparison
            .features
            .iter()
            .all(|f| f.included.len() == comparison.plans.len()));
    }
}
