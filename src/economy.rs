//! Credits economy
//!
//! Credits are the in-app currency used to pay entry fees. Players earn
//! them through a daily claim and by watching rewarded ads, or buy them in
//! bundles. Bigger bundles must never be worse value than smaller ones.

use std::{cmp::Ordering, collections::BTreeMap};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A purchasable package of credits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Bundle {
    /// Price in the store currency
    #[garde(custom(validate_positive_price))]
    pub price: f64,
    /// Credits granted on purchase
    #[garde(range(min = 1))]
    pub credits: u64,
}

fn validate_positive_price(price: &f64, _ctx: &()) -> garde::Result {
    if price.is_finite() && *price > 0. {
        Ok(())
    } else {
        Err(garde::Error::new("price must be positive"))
    }
}

impl Bundle {
    /// Credits received per unit of currency spent
    pub fn credits_per_unit(&self) -> f64 {
        self.credits as f64 / self.price
    }
}

/// Daily rewards and the purchasable bundle table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreditsConfig {
    /// Credits granted by the once-a-day claim
    #[garde(skip)]
    pub daily_claim_amount: u64,
    /// Credits granted per rewarded ad
    #[garde(skip)]
    pub ad_reward_amount: u64,
    /// Maximum rewarded ads per day
    #[garde(skip)]
    pub ad_reward_daily_limit: u32,
    /// Purchasable bundles keyed by store identifier
    #[garde(dive, custom(validate_bundle_value))]
    pub bundles: BTreeMap<String, Bundle>,
}

fn validate_bundle_value(bundles: &BTreeMap<String, Bundle>, _ctx: &()) -> garde::Result {
    match value_regressions(bundles).next() {
        Some((cheaper, pricier)) => Err(garde::Error::new(format!(
            "bundle `{pricier}` offers fewer credits per unit than cheaper bundle `{cheaper}`"
        ))),
        None => Ok(()),
    }
}

fn by_value(a: &(&String, &Bundle), b: &(&String, &Bundle)) -> Ordering {
    a.1.credits_per_unit().total_cmp(&b.1.credits_per_unit())
}

/// Yields `(cheaper, pricier)` bundle pairs from adjacent price tiers where
/// the pricier bundle is worse value
///
/// Bundles sharing a price form one tier and are not compared with each
/// other. Each tier's worst bundle is checked against the previous tier's
/// best.
fn value_regressions(
    bundles: &BTreeMap<String, Bundle>,
) -> impl Iterator<Item = (&String, &String)> {
    let tiers = bundles
        .iter()
        .sorted_by(|(_, a), (_, b)| a.price.total_cmp(&b.price))
        .chunk_by(|(_, bundle)| bundle.price)
        .into_iter()
        .map(|(_, tier)| tier.collect_vec())
        .collect_vec();

    tiers
        .into_iter()
        .tuple_windows()
        .filter_map(|(cheaper, pricier)| {
            let best = cheaper.iter().copied().max_by(by_value)?;
            let worst = pricier.iter().copied().min_by(by_value)?;
            (worst.1.credits_per_unit() < best.1.credits_per_unit()).then_some((best.0, worst.0))
        })
}

impl CreditsConfig {
    /// Looks up a bundle by its store identifier
    pub fn bundle(&self, id: &str) -> Option<&Bundle> {
        self.bundles.get(id)
    }

    /// Bundles ordered from cheapest to most expensive
    pub fn bundles_by_price(&self) -> Vec<(&str, &Bundle)> {
        self.bundles
            .iter()
            .map(|(id, bundle)| (id.as_str(), bundle))
            .sorted_by(|(_, a), (_, b)| a.price.total_cmp(&b.price))
            .collect_vec()
    }

    /// Whether larger bundles always offer equal-or-better value
    pub fn is_value_monotonic(&self) -> bool {
        value_regressions(&self.bundles).next().is_none()
    }

    /// Rewarded ads still available today after `watched` ads
    pub fn remaining_ad_rewards(&self, watched: u32) -> u32 {
        self.ad_reward_daily_limit.saturating_sub(watched)
    }
}
