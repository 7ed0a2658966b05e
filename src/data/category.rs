//! Offense Category Module
//! Derives the three-way offense category from free-text descriptions and
//! defines the category selection offered by the dashboard.

use serde::Serialize;
use std::fmt;

/// Derived classification of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffenseCategory {
    Burglary,
    Theft,
    Other,
}

impl OffenseCategory {
    /// Classify a description. Burglary wins over Theft when both match.
    pub fn from_description(description: Option<&str>) -> Self {
        let text = description.unwrap_or("NAN").to_uppercase();
        if text.contains("BURGLARY") {
            OffenseCategory::Burglary
        } else if text.contains("THEFT") {
            OffenseCategory::Theft
        } else {
            OffenseCategory::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OffenseCategory::Burglary => "Burglary",
            OffenseCategory::Theft => "Theft",
            OffenseCategory::Other => "Other",
        }
    }
}

/// Category selection driving the filtered views. `Other` is not selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Burglary,
    Theft,
}

impl CategoryFilter {
    /// Options in the order the selector shows them.
    pub const OPTIONS: [CategoryFilter; 3] = [
        CategoryFilter::All,
        CategoryFilter::Burglary,
        CategoryFilter::Theft,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Burglary => "Burglary",
            CategoryFilter::Theft => "Theft",
        }
    }

    /// The category rows must carry to pass, or `None` for "All".
    pub fn category(&self) -> Option<OffenseCategory> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Burglary => Some(OffenseCategory::Burglary),
            CategoryFilter::Theft => Some(OffenseCategory::Theft),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burglary_checked_first() {
        assert_eq!(
            OffenseCategory::from_description(Some("BURGLARY-THEFT OF PROPERTY")),
            OffenseCategory::Burglary
        );
        assert_eq!(
            OffenseCategory::from_description(Some("THEFT AFTER BURGLARY")),
            OffenseCategory::Burglary
        );
    }

    #[test]
    fn test_case_insensitive_match() {
        assert_eq!(
            OffenseCategory::from_description(Some("theft from auto")),
            OffenseCategory::Theft
        );
        assert_eq!(
            OffenseCategory::from_description(Some("Burglary of Habitation")),
            OffenseCategory::Burglary
        );
    }

    #[test]
    fn test_absent_and_unmatched_are_other() {
        assert_eq!(OffenseCategory::from_description(None), OffenseCategory::Other);
        assert_eq!(
            OffenseCategory::from_description(Some("ASSAULT")),
            OffenseCategory::Other
        );
        assert_eq!(OffenseCategory::from_description(Some("")), OffenseCategory::Other);
    }

    #[test]
    fn test_filter_categories() {
        assert_eq!(CategoryFilter::default(), CategoryFilter::All);
        assert_eq!(CategoryFilter::All.category(), None);
        assert_eq!(
            CategoryFilter::Theft.category(),
            Some(OffenseCategory::Theft)
        );
        assert!(CategoryFilter::OPTIONS
            .iter()
            .all(|f| f.category() != Some(OffenseCategory::Other)));
    }

    #[test]
    fn test_filter_labels_match_category_labels() {
        for filter in [CategoryFilter::Burglary, CategoryFilter::Theft] {
            let category = filter.category().unwrap();
            assert_eq!(category.label(), filter.label());
            assert_eq!(filter.to_string(), category.label());
        }
        assert_eq!(OffenseCategory::Other.label(), "Other");
    }
}
