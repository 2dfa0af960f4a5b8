use serde::{Deserialize, Serialize};

use super::TrendingPeriod;

pub const ALL_SECTIONS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// `"all"` or a lowercase section name
    pub section: String,
    pub search_query: String,
    pub trending_period: TrendingPeriod,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            section: ALL_SECTIONS.to_string(),
            search_query: String::new(),
            trending_period: TrendingPeriod::default(),
        }
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub section: Option<String>,
    pub search_query: Option<String>,
    pub trending_period: Option<TrendingPeriod>,
}

impl FilterUpdate {
    pub fn section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..Self::default()
        }
    }

    pub fn search_query(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn trending_period(period: TrendingPeriod) -> Self {
        Self {
            trending_period: Some(period),
            ..Self::default()
        }
    }
}

/// Which fields actually changed value during a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterChanges {
    pub section: bool,
    pub search_query: bool,
    pub trending_period: bool,
}

impl FilterState {
    pub fn merge(&mut self, update: FilterUpdate) -> FilterChanges {
        let mut changes = FilterChanges::default();

        if let Some(section) = update.section {
            changes.section = section != self.section;
            self.section = section;
        }
        if let Some(query) = update.search_query {
            changes.search_query = query != self.search_query;
            self.search_query = query;
        }
        if let Some(period) = update.trending_period {
            changes.trending_period = period != self.trending_period;
            self.trending_period = period;
        }

        changes
    }

    pub fn shows_all_sections(&self) -> bool {
        self.section == ALL_SECTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let filters = FilterState::default();
        assert_eq!(filters.section, "all");
        assert!(filters.search_query.is_empty());
        assert_eq!(filters.trending_period, TrendingPeriod::Day);
        assert!(filters.shows_all_sections());
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut filters = FilterState::default();
        filters.search_query = "mars".to_string();

        let changes = filters.merge(FilterUpdate::section("technology"));

        assert!(changes.section);
        assert!(!changes.search_query);
        assert_eq!(filters.section, "technology");
        assert_eq!(filters.search_query, "mars");
    }

    #[test]
    fn test_merge_same_value_is_not_a_change() {
        let mut filters = FilterState::default();
        let changes = filters.merge(FilterUpdate {
            section: Some("all".to_string()),
            trending_period: Some(TrendingPeriod::Week),
            ..FilterUpdate::default()
        });

        assert!(!changes.section);
        assert!(changes.trending_period);
        assert_eq!(filters.trending_period, TrendingPeriod::Week);
    }
}
