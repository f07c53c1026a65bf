//! # Catalog Search
//!
//! Plain text filtering and ranking of products against a visual
//! classifier's guess.
//!
//! The classifier itself (image in, attributes out) lives outside this
//! crate. Ranking is deterministic: the same detection over the same catalog
//! always produces the same list.
//!
//! ## Scoring
//! ```text
//! per search term:   SKU +25   title +15   category +10   description +5
//! tags "heavy" and gsm > 200        +10
//! tags "light" and gsm < 150        +10
//! every term in title/desc/SKU      +50
//!
//! wrong catalog type → excluded;  keep score ≥ 15;  best 12
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Product, ProductType};

/// Results returned when there is no detection to rank by.
pub const UNRANKED_RESULTS: usize = 4;

/// Minimum score for a product to count as a match.
pub const MIN_SCORE: i64 = 15;

/// Maximum number of ranked results.
pub const MAX_RESULTS: usize = 12;

/// What the visual classifier saw in a photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualDetection {
    pub catalog_type: ProductType,
    pub tags: Vec<String>,
    pub color: String,
    pub material: String,
    pub pattern: String,
    pub texture: String,
    pub finish: String,
}

impl VisualDetection {
    /// Tags plus non-empty attributes, lowercased.
    pub fn search_terms(&self) -> Vec<String> {
        self.tags
            .iter()
            .chain([&self.color, &self.material, &self.pattern, &self.texture, &self.finish])
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect()
    }

    fn has_tag(&self, needle: &str) -> bool {
        self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Relevance of one product. `None` when the catalog type differs.
pub fn score_product(product: &Product, detection: &VisualDetection, terms: &[String]) -> Option<i64> {
    if product.product_type != detection.catalog_type {
        return None;
    }

    let title = product.title.to_lowercase();
    let category = product.category.to_lowercase();
    let sku = product.sku.to_lowercase();
    let description = product.description.to_lowercase();

    let mut score = 0;
    for term in terms {
        let term = term.as_str();
        if sku.contains(term) {
            score += 25;
        }
        if title.contains(term) {
            score += 15;
        }
        if category.contains(term) {
            score += 10;
        }
        if description.contains(term) {
            score += 5;
        }
    }

    let gsm = product.gsm.unwrap_or(0);
    if detection.has_tag("heavy") && gsm > 200 {
        score += 10;
    }
    if detection.has_tag("light") && gsm < 150 {
        score += 10;
    }

    let every_term_matches = terms
        .iter()
        .all(|t| title.contains(t.as_str()) || description.contains(t.as_str()) || sku.contains(t.as_str()));
    if every_term_matches {
        score += 50;
    }

    Some(score)
}

/// Product ids most similar to the detection, best first.
///
/// Without a detection the first few catalog products are returned as-is.
pub fn rank_visual_matches(detection: Option<&VisualDetection>, products: &[Product]) -> Vec<String> {
    let Some(detection) = detection else {
        return products
            .iter()
            .take(UNRANKED_RESULTS)
            .map(|p| p.id.clone())
            .collect();
    };

    let terms = detection.search_terms();
    let mut scored: Vec<(&Product, i64)> = products
        .iter()
        .filter_map(|p| score_product(p, detection, &terms).map(|s| (p, s)))
        .filter(|(_, s)| *s >= MIN_SCORE)
        .collect();

    // Stable: equal scores keep catalog order
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(p, _)| p.id.clone())
        .collect()
}

/// Catalog filter: optional type, then a case-insensitive title/SKU match.
pub fn filter_catalog<'a>(products: &'a [Product], catalog_type: Option<ProductType>, query: &str) -> Vec<&'a Product> {
    let query = query.trim().to_lowercase();

    products
        .iter()
        .filter(|p| catalog_type.map_or(true, |t| p.product_type == t))
        .filter(|p| {
            query.is_empty() || p.title.to_lowercase().contains(&query) || p.sku.to_lowercase().contains(&query)
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fabric, hardware};

    fn silk() -> Product {
        let mut p = fabric("silk", 1000);
        p.sku = "SILK-RED".to_string();
        p.title = "Red Silk Satin".to_string();
        p.category = "Silk".to_string();
        p.description = "Smooth satin weave".to_string();
        p.gsm = Some(90);
        p
    }

    fn denim() -> Product {
        let mut p = fabric("denim", 800);
        p.sku = "DNM-14".to_string();
        p.title = "Blue Denim".to_string();
        p.category = "Cotton".to_string();
        p.gsm = Some(400);
        p
    }

    fn detection(tags: &[&str], color: &str) -> VisualDetection {
        VisualDetection {
            catalog_type: ProductType::Fabric,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            color: color.to_string(),
            ..VisualDetection::default()
        }
    }

    #[test]
    fn test_no_detection_returns_first_four() {
        let products: Vec<Product> = (0..6).map(|i| fabric(&format!("p{}", i), 100)).collect();
        assert_eq!(rank_visual_matches(None, &products), vec!["p0", "p1", "p2", "p3"]);
    }

    #[test]
    fn test_search_terms() {
        let d = VisualDetection {
            tags: vec!["Satin".to_string()],
            color: "RED".to_string(),
            finish: String::new(),
            ..VisualDetection::default()
        };
        assert_eq!(d.search_terms(), vec!["satin", "red"]);
    }

    #[test]
    fn test_scoring() {
        let d = detection(&["satin", "light"], "red");
        let terms = d.search_terms();

        // satin: title 15 + desc 5; light: none; red: sku 25 + title 15;
        // light tag with gsm 90: +10
        assert_eq!(score_product(&silk(), &d, &terms), Some(70));
        assert_eq!(score_product(&hardware("zip", 10), &d, &terms), None);
    }

    #[test]
    fn test_all_terms_bonus() {
        let d = detection(&["denim"], "blue");
        let terms = d.search_terms();
        // denim: title 15; blue: title 15; both in title: +50
        assert_eq!(score_product(&denim(), &d, &terms), Some(80));
    }

    #[test]
    fn test_ranking_filters_and_orders() {
        let d = detection(&["heavy"], "blue");
        let products = vec![silk(), hardware("zip", 10), denim()];

        // denim: blue in title 15, heavy & gsm 400 +10 = 25; silk: 0
        assert_eq!(rank_visual_matches(Some(&d), &products), vec!["denim"]);
    }

    #[test]
    fn test_ranking_caps_results_and_is_stable() {
        let products: Vec<Product> = (0..20)
            .map(|i| {
                let mut p = fabric(&format!("p{:02}", i), 100);
                p.title = "Linen".to_string();
                p
            })
            .collect();
        let d = detection(&["linen"], "");

        let ranked = rank_visual_matches(Some(&d), &products);
        assert_eq!(ranked.len(), MAX_RESULTS);
        assert_eq!(ranked[0], "p00");
        assert_eq!(ranked[11], "p11");
    }

    #[test]
    fn test_filter_catalog() {
        let products = vec![silk(), denim(), hardware("zip", 10)];

        let hits = filter_catalog(&products, Some(ProductType::Fabric), "dnm");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "denim");

        assert_eq!(filter_catalog(&products, None, "").len(), 3);
        assert_eq!(filter_catalog(&products, Some(ProductType::Hardware), "  ").len(), 1);
        assert_eq!(filter_catalog(&products, None, "SATIN").len(), 1);
    }
}
