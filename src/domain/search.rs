use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchSort {
    #[default]
    Newest,
    Oldest,
    Relevance,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSort::Newest => "newest",
            SearchSort::Oldest => "oldest",
            SearchSort::Relevance => "relevance",
        }
    }
}

impl std::str::FromStr for SearchSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SearchSort::Newest),
            "oldest" => Ok(SearchSort::Oldest),
            "relevance" => Ok(SearchSort::Relevance),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Optional parameters of an article search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub sort: SearchSort,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: u32,
}

impl SearchOptions {
    /// Query pairs in the order the search endpoint documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("sort", self.sort.as_str().to_string())];
        if let Some(begin) = self.begin_date {
            pairs.push(("begin_date", begin.format("%Y%m%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y%m%d").to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs
    }
}
