//! Search request and response models.

use serde::{Deserialize, Deserializer, Serialize};

/// Largest page the search endpoint accepts
pub const MAX_PER_PAGE: usize = 100;

/// Default page size for `search_datasets`
pub const DEFAULT_PER_PAGE: usize = 10;

/// Sort mode for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Server-side relevance ranking; no ordering parameters are sent
    #[default]
    Relevance,
    /// Alphabetical, ascending
    Name,
    /// Newest first
    Date,
}

impl SortMode {
    /// Parse a sort mode, treating anything unrecognised as relevance
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "name" => SortMode::Name,
            "date" => SortMode::Date,
            _ => SortMode::Relevance,
        }
    }

    /// The `(sort, order)` parameter values, if any are sent
    pub fn params(&self) -> Option<(&'static str, &'static str)> {
        match self {
            SortMode::Relevance => None,
            SortMode::Name => Some(("name", "asc")),
            SortMode::Date => Some(("date", "desc")),
        }
    }
}

/// Kind of search hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Dataset,
    Dataverse,
    File,
}

impl ItemType {
    /// Parse a type filter; unknown values yield no filter
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dataset" => Some(ItemType::Dataset),
            "dataverse" => Some(ItemType::Dataverse),
            "file" => Some(ItemType::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Dataset => "dataset",
            ItemType::Dataverse => "dataverse",
            ItemType::File => "file",
        }
    }
}

/// Search parameters for the `/search` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query; `*` when the caller gave nothing
    pub query: String,

    /// Results per page, always within `1..=100`
    pub per_page: usize,

    pub sort: SortMode,

    pub item_type: Option<ItemType>,

    /// Canonical dataverse identifier (already resolved)
    pub subtree: Option<String>,

    /// Geographic coverage filters
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: "*".to_string(),
            per_page: DEFAULT_PER_PAGE,
            sort: SortMode::Relevance,
            item_type: None,
            subtree: None,
            country: None,
            province: None,
            city: None,
        }
    }
}

impl SearchRequest {
    /// Create a new search request; a blank query searches everything
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let query = if query.trim().is_empty() {
            "*".to_string()
        } else {
            query
        };
        Self {
            query,
            ..Default::default()
        }
    }

    /// Set page size, clamped to `1..=100`
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }

    /// Restrict to a dataverse subtree (caller resolves aliases first)
    pub fn subtree(mut self, subtree: impl Into<String>) -> Self {
        self.subtree = Some(subtree.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Filter-query clauses, one per geographic filter
    pub fn filter_clauses(&self) -> Vec<String> {
        [
            ("country", &self.country),
            ("state", &self.province),
            ("city", &self.city),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| format!("{}:{}", field, v)))
        .collect()
    }

    /// Query-string pairs in the order they are sent
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("q".to_string(), self.query.clone()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];

        if let Some((sort, order)) = self.sort.params() {
            pairs.push(("sort".to_string(), sort.to_string()));
            pairs.push(("order".to_string(), order.to_string()));
        }

        if let Some(item_type) = self.item_type {
            pairs.push(("type".to_string(), item_type.as_str().to_string()));
        }

        if let Some(ref subtree) = self.subtree {
            pairs.push(("subtree".to_string(), subtree.clone()));
        }

        for clause in self.filter_clauses() {
            pairs.push(("fq".to_string(), clause));
        }

        pairs
    }
}

/// A single hit from the `/search` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Persistent identifier, datasets only
    #[serde(default)]
    pub global_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<String>,

    #[serde(default)]
    pub published_at: Option<String>,
}

impl SearchItem {
    pub fn is_dataset(&self) -> bool {
        self.kind.as_deref() == Some("dataset")
    }
}

/// The `data` member of a search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<SearchItem>,

    #[serde(default)]
    pub total_count: u64,
}

/// Dataverse sends `null` for empty lists on some records
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
