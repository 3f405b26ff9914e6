//! # Commission Resolver
//!
//! Resolves which commission rate applies to each line of a document and
//! how much the attached entity earns.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line item ──► product ──► category_id                                  │
//! │                                │                                        │
//! │        ┌───────────────────────┴───────────────────────┐                │
//! │        │ profile.category_rates has EXACT entry?       │                │
//! │        │   yes → use the category rate                 │                │
//! │        │   no  → fall back to profile.overall_rate     │                │
//! │        └───────────────────────────────────────────────┘                │
//! │                                                                         │
//! │  Category rate wins even when the overall rate is also set.             │
//! │  No inheritance from parent categories - exact match only.              │
//! │  The two rates are never summed.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UI disables the overall field once a category rate exists, but
//! that is a nicety, not the contract: this resolver applies
//! category-first precedence unconditionally.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::{Exact, Money, Rate};
use crate::totals::line_net;
use crate::types::{CommissionProfile, LineItem, Product, ProductCategory};
use crate::MAX_CATEGORY_DEPTH;

// =============================================================================
// Category Index
// =============================================================================

/// A validated view over the product category forest.
///
/// The source data is a parent-pointer list with no acyclicity guarantee,
/// so construction walks every node's ancestor chain with a depth bound
/// and fails fast on a cycle instead of looping forever at lookup time.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    nodes: HashMap<String, ProductCategory>,
}

impl CategoryIndex {
    /// Builds the index, validating every parent pointer.
    ///
    /// ## Errors
    /// - [`ValidationError::UnknownParentCategory`] for a dangling parent
    /// - [`ValidationError::CategoryCycle`] when a category is its own
    ///   ancestor, or a chain exceeds [`MAX_CATEGORY_DEPTH`]
    pub fn build(categories: Vec<ProductCategory>) -> Result<Self, ValidationError> {
        let nodes: HashMap<String, ProductCategory> = categories
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        for category in nodes.values() {
            let mut current = category;
            let mut depth = 0usize;

            while let Some(parent_id) = &current.parent_id {
                depth += 1;
                if depth > MAX_CATEGORY_DEPTH {
                    return Err(ValidationError::CategoryCycle {
                        category_id: category.id.clone(),
                        max_depth: MAX_CATEGORY_DEPTH,
                    });
                }

                let parent = nodes.get(parent_id).ok_or_else(|| {
                    ValidationError::UnknownParentCategory {
                        category_id: current.id.clone(),
                        parent_id: parent_id.clone(),
                    }
                })?;

                if parent.id == category.id {
                    return Err(ValidationError::CategoryCycle {
                        category_id: category.id.clone(),
                        max_depth: MAX_CATEGORY_DEPTH,
                    });
                }
                current = parent;
            }
        }

        Ok(CategoryIndex { nodes })
    }

    /// Looks up a category by id.
    pub fn get(&self, id: &str) -> Option<&ProductCategory> {
        self.nodes.get(id)
    }

    /// Ancestor ids from direct parent to root. Safe by construction:
    /// the chain was bounded and cycle-checked at build time.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(id);
        while let Some(node) = current {
            match &node.parent_id {
                Some(parent_id) => {
                    chain.push(parent_id.as_str());
                    current = self.nodes.get(parent_id);
                }
                None => break,
            }
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// =============================================================================
// Commission Outcome
// =============================================================================

/// Commission earned on one category bucket of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCommission {
    /// Category the bucket belongs to; `None` collects lines whose
    /// product has no category (or no longer exists).
    pub category_id: Option<String>,
    /// Rate applied to this bucket.
    pub rate: Rate,
    /// Net sales in the bucket.
    pub net: Money,
    /// Commission earned on the bucket.
    pub amount: Money,
}

/// The resolved commission for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommissionOutcome {
    /// The fallback rate lines fell through to (the profile's overall
    /// rate), if the profile carries one.
    pub fallback_rate: Option<Rate>,
    /// Total commission. Equals the sum of the breakdown amounts.
    pub amount: Money,
    /// Per-category breakdown, `None` bucket first, then by category id.
    pub by_category: Vec<CategoryCommission>,
}

// =============================================================================
// resolve_commission
// =============================================================================

/// Resolves the commission a profile earns on a document's lines.
///
/// Per line: the product's category is looked up; an exact entry in
/// `profile.category_rates` wins, otherwise the overall rate applies.
/// Lines with no category match and no overall rate earn nothing.
/// Nets accumulate exactly per category bucket and each bucket rounds
/// once, so the breakdown always sums to the total.
///
/// ## Errors
/// - [`ValidationError::ProfileWithoutRate`] when the profile has neither
///   an overall rate nor any category rate
/// - [`ValidationError::ProfileRequiresCategoryRates`] when an agent or
///   sub-agent profile (advanced commission mode) has no category rates
/// - Arithmetic guards from the line math, as in the totals calculator
pub fn resolve_commission(
    profile: &CommissionProfile,
    lines: &[LineItem],
    products: &[Product],
    categories: &CategoryIndex,
) -> CoreResult<CommissionOutcome> {
    if profile.overall_rate.is_none() && profile.category_rates.is_empty() {
        return Err(ValidationError::ProfileWithoutRate {
            profile_id: profile.id.clone(),
        }
        .into());
    }
    if profile.entity.requires_category_rates() && profile.category_rates.is_empty() {
        return Err(ValidationError::ProfileRequiresCategoryRates {
            profile_id: profile.id.clone(),
            entity: profile.entity.label().to_string(),
        }
        .into());
    }

    let by_product: HashMap<&str, &Product> =
        products.iter().map(|p| (p.id.as_str(), p)).collect();

    // Bucket nets by category at full precision; round per bucket below.
    let mut buckets: BTreeMap<Option<String>, (Rate, Exact)> = BTreeMap::new();

    for (index, line) in lines.iter().enumerate() {
        let net = line_net(index, line)?;

        let category_id = by_product
            .get(line.product_id.as_str())
            .and_then(|p| p.category_id.as_deref())
            .filter(|id| categories.get(id).is_some());

        let (bucket_key, rate) = match category_id {
            Some(id) if profile.category_rates.contains_key(id) => {
                (Some(id.to_string()), profile.category_rates[id])
            }
            Some(id) => (
                Some(id.to_string()),
                profile.overall_rate.unwrap_or(Rate::zero()),
            ),
            None => (None, profile.overall_rate.unwrap_or(Rate::zero())),
        };

        let entry = buckets.entry(bucket_key).or_insert((rate, Exact::ZERO));
        entry.1 = entry.1 + net;
    }

    let mut total = Money::zero();
    let mut by_category = Vec::with_capacity(buckets.len());
    for (category_id, (rate, net)) in buckets {
        let amount = net.apply_rate(rate).to_money();
        total += amount;
        by_category.push(CategoryCommission {
            category_id,
            rate,
            net: net.to_money(),
            amount,
        });
    }

    Ok(CommissionOutcome {
        fallback_rate: profile.overall_rate,
        amount: total,
        by_category,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::money::Quantity;
    use crate::types::CommissionEntity;

    fn category(id: &str, parent: Option<&str>) -> ProductCategory {
        ProductCategory {
            id: id.to_string(),
            name: id.to_string(),
            parent_id: parent.map(|p| p.to_string()),
        }
    }

    fn product(id: &str, category: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{id}"),
            name: id.to_string(),
            category_id: category.map(|c| c.to_string()),
            brand: None,
            purchase_price: Money::from_minor(500),
            sell_price: Money::from_minor(1000),
        }
    }

    fn salesperson_profile(overall_bps: u32, rates: &[(&str, u32)]) -> CommissionProfile {
        CommissionProfile {
            id: "prof-1".to_string(),
            entity: CommissionEntity::Salesperson,
            overall_rate: Some(Rate::from_bps(overall_bps)),
            category_rates: rates
                .iter()
                .map(|(id, bps)| (id.to_string(), Rate::from_bps(*bps)))
                .collect(),
        }
    }

    #[test]
    fn index_accepts_a_two_level_forest() {
        let index = CategoryIndex::build(vec![
            category("apparel", None),
            category("shoes", Some("apparel")),
            category("grocery", None),
        ])
        .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.ancestors("shoes"), vec!["apparel"]);
        assert!(index.ancestors("grocery").is_empty());
    }

    #[test]
    fn index_rejects_cycles_and_dangling_parents() {
        let err = CategoryIndex::build(vec![
            category("a", Some("b")),
            category("b", Some("a")),
        ])
        .unwrap_err();
        assert!(matches!(err, ValidationError::CategoryCycle { .. }));

        let err = CategoryIndex::build(vec![category("a", Some("ghost"))]).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownParentCategory { .. }));
    }

    #[test]
    fn index_rejects_self_parent() {
        let err = CategoryIndex::build(vec![category("a", Some("a"))]).unwrap_err();
        assert!(matches!(err, ValidationError::CategoryCycle { .. }));
    }

    #[test]
    fn category_rate_wins_over_overall_rate() {
        // overall 5%, shoes 10%; shoes line of net 200.00 → 20.00, not 10.00
        let index = CategoryIndex::build(vec![category("cat-shoes", None)]).unwrap();
        let profile = salesperson_profile(500, &[("cat-shoes", 1000)]);
        let products = vec![product("p-boot", Some("cat-shoes"))];
        let lines = vec![LineItem::simple(
            "p-boot",
            Quantity::from_units(1),
            Money::from_minor(20_000),
        )];

        let outcome = resolve_commission(&profile, &lines, &products, &index).unwrap();
        assert_eq!(outcome.amount.minor(), 2_000);
        assert_eq!(outcome.by_category.len(), 1);
        assert_eq!(outcome.by_category[0].rate, Rate::from_bps(1000));
    }

    #[test]
    fn unmatched_lines_fall_back_to_overall_rate() {
        let index =
            CategoryIndex::build(vec![category("cat-shoes", None), category("cat-bags", None)])
                .unwrap();
        let profile = salesperson_profile(500, &[("cat-shoes", 1000)]);
        let products = vec![
            product("p-boot", Some("cat-shoes")),
            product("p-bag", Some("cat-bags")),
            product("p-loose", None),
        ];
        let lines = vec![
            LineItem::simple("p-boot", Quantity::from_units(1), Money::from_minor(10_000)),
            LineItem::simple("p-bag", Quantity::from_units(1), Money::from_minor(10_000)),
            LineItem::simple("p-loose", Quantity::from_units(1), Money::from_minor(10_000)),
        ];

        let outcome = resolve_commission(&profile, &lines, &products, &index).unwrap();
        // shoes: 10% of 100.00 = 10.00; bags + uncategorized: 5% of 100.00 each
        assert_eq!(outcome.amount.minor(), 1_000 + 500 + 500);
        assert_eq!(outcome.fallback_rate, Some(Rate::from_bps(500)));

        // None bucket sorts first, then category ids
        assert_eq!(outcome.by_category[0].category_id, None);
        assert_eq!(outcome.by_category[1].category_id.as_deref(), Some("cat-bags"));
        assert_eq!(outcome.by_category[2].category_id.as_deref(), Some("cat-shoes"));

        let breakdown_total: Money = outcome.by_category.iter().map(|c| c.amount).sum();
        assert_eq!(breakdown_total, outcome.amount);
    }

    #[test]
    fn no_inheritance_from_parent_category() {
        // Rate set on the parent, product sits in the child: fallback applies.
        let index = CategoryIndex::build(vec![
            category("apparel", None),
            category("shoes", Some("apparel")),
        ])
        .unwrap();
        let profile = salesperson_profile(500, &[("apparel", 1000)]);
        let products = vec![product("p-boot", Some("shoes"))];
        let lines = vec![LineItem::simple(
            "p-boot",
            Quantity::from_units(1),
            Money::from_minor(10_000),
        )];

        let outcome = resolve_commission(&profile, &lines, &products, &index).unwrap();
        assert_eq!(outcome.amount.minor(), 500); // 5%, not 10%
    }

    #[test]
    fn profile_without_any_rate_is_rejected() {
        let index = CategoryIndex::build(vec![]).unwrap();
        let profile = CommissionProfile {
            id: "prof-empty".to_string(),
            entity: CommissionEntity::Salesperson,
            overall_rate: None,
            category_rates: BTreeMap::new(),
        };
        let err = resolve_commission(&profile, &[], &[], &index).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::ProfileWithoutRate { .. })
        ));
    }

    #[test]
    fn agent_profile_requires_category_rates() {
        let index = CategoryIndex::build(vec![]).unwrap();
        let profile = CommissionProfile {
            id: "prof-agent".to_string(),
            entity: CommissionEntity::Agent,
            overall_rate: Some(Rate::from_bps(500)),
            category_rates: BTreeMap::new(),
        };
        let err = resolve_commission(&profile, &[], &[], &index).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::ProfileRequiresCategoryRates { .. })
        ));
    }

    #[test]
    fn commission_pays_on_line_net_not_taxed_total() {
        let index = CategoryIndex::build(vec![]).unwrap();
        let profile = salesperson_profile(1000, &[]);
        let products = vec![product("p", None)];
        let line = LineItem {
            product_id: "p".to_string(),
            quantity: Quantity::from_units(1),
            unit_price: Money::from_minor(10_000),
            line_discount: Money::from_minor(2_000),
            line_tax_rate: Rate::from_bps(2_500), // tax must not inflate commission
        };

        let outcome = resolve_commission(&profile, &[line], &products, &index).unwrap();
        assert_eq!(outcome.amount.minor(), 800); // 10% of 80.00
    }
}
