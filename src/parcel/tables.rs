use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

use crate::constants::MAX_ZONING_SCORE;
use crate::error::{ParcelError, Result};

/// Zoning reference data: land-use code to zoning category, and category to fitness score.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LookupTables {
    /// Land-use code -> zoning category
    pub land_use: HashMap<String, String>,
    /// Zoning category -> fitness score (0..=5)
    pub scores: HashMap<String, u8>,
}

impl Default for LookupTables {
    fn default() -> Self {
        let land_use = [
            ("RIO", "LI"),
            ("RV", "HI"),
            ("RIL", "B2"),
            ("CI", "AG"),
            ("FUV", "R1"),
            ("EI", "Residential"),
            ("EV", "Residential"),
        ];
        let scores = [
            ("LI", 5),
            ("HI", 4),
            ("B2", 3),
            ("AG", 2),
            ("R1", 1),
            ("Residential", 0),
        ];

        Self {
            land_use: land_use
                .into_iter()
                .map(|(code, category)| (code.to_string(), category.to_string()))
                .collect(),
            scores: scores
                .into_iter()
                .map(|(category, score)| (category.to_string(), score))
                .collect(),
        }
    }
}

impl LookupTables {
    pub fn zoning_category(&self, land_use_code: &str) -> Option<&str> {
        self.land_use.get(land_use_code).map(String::as_str)
    }

    pub fn category_score(&self, category: &str) -> Option<u8> {
        self.scores.get(category).copied()
    }

    /// Categories reachable from a land-use code that have no configured score, sorted.
    pub fn unscored_categories(&self) -> Vec<&str> {
        self.land_use
            .values()
            .filter(|category| !self.scores.contains_key(category.as_str()))
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rejects scores outside the 0..=5 range.
    pub fn validate(&self) -> Result<()> {
        if let Some((category, score)) = self
            .scores
            .iter()
            .find(|(_, score)| **score > MAX_ZONING_SCORE)
        {
            return Err(ParcelError::Config(format!(
                "zoning score for '{}' is {}, maximum is {}",
                category, score, MAX_ZONING_SCORE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_tables_are_complete() {
        let tables = LookupTables::default();
        assert_eq!(tables.land_use.len(), 7);
        assert_eq!(tables.scores.len(), 6);
        assert!(tables.unscored_categories().is_empty());
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_lookup() {
        let tables = LookupTables::default();
        assert_eq!(tables.zoning_category("RIO"), Some("LI"));
        assert_eq!(tables.zoning_category("EV"), Some("Residential"));
        assert_eq!(tables.zoning_category("rio"), None);
        assert_eq!(tables.category_score("HI"), Some(4));
        assert_eq!(tables.category_score("Residential"), Some(0));
    }

    #[test]
    fn test_unscored_categories_reported_once() {
        let mut tables = LookupTables::default();
        tables.land_use.insert("XA".to_string(), "MX".to_string());
        tables.land_use.insert("XB".to_string(), "MX".to_string());
        assert_eq!(tables.unscored_categories(), vec!["MX"]);
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let mut tables = LookupTables::default();
        tables.scores.insert("LI".to_string(), 9);
        assert!(matches!(tables.validate(), Err(ParcelError::Config(_))));
    }

    #[test]
    fn test_deserialize_partial_table_keeps_reference_scores() {
        let tables: LookupTables = toml::from_str(
            r#"
            [land_use]
            AB = "LI"
            "#,
        )
        .unwrap();
        assert_eq!(tables.zoning_category("AB"), Some("LI"));
        assert_eq!(tables.zoning_category("RIO"), None);
        assert_eq!(tables.category_score("LI"), Some(5));
    }
}
