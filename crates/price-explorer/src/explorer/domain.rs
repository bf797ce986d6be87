use serde::Serialize;
use std::fmt;

/// Opaque listing identifier as it appears in the source table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One property row with its model-predicted nightly price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub location: GeoPoint,
    pub predicted_price: f64,
    /// Source list price kept verbatim (e.g. `$120.00`).
    pub price: Option<String>,
    pub neighbourhood: Option<String>,
}

/// Listing columns that may carry the neighbourhood label, most specific first.
pub const NEIGHBOURHOOD_CANDIDATES: [&str; 3] = [
    "neighbourhood_cleansed",
    "neighbourhood",
    "neighbourhood_group",
];

/// The listing column chosen as the neighbourhood dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NeighbourhoodColumn(pub &'static str);

impl NeighbourhoodColumn {
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighbourhoodRecord {
    pub group: Option<String>,
    pub name: String,
}

/// Auxiliary neighbourhood table; only the names are consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighbourhoodLookup {
    pub records: Vec<NeighbourhoodRecord>,
}

impl NeighbourhoodLookup {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Neighbourhood selector value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NeighbourhoodChoice {
    #[default]
    All,
    Exact(String),
}

impl NeighbourhoodChoice {
    pub const ALL_LABEL: &'static str = "All";

    /// Blank input and the literal `All` both select every neighbourhood.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(value) if value == Self::ALL_LABEL => Self::All,
            Some(value) => Self::Exact(value.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => Self::ALL_LABEL,
            Self::Exact(value) => value,
        }
    }

    pub fn matches(&self, neighbourhood: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Exact(selected) => neighbourhood == Some(selected.as_str()),
        }
    }
}

/// Inclusive whole-currency price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    pub fn new(min: i64, max: i64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min as f64 && price <= self.max as f64
    }

    /// Narrows `self` so it never leaves `bounds`.
    pub fn clamp_to(self, bounds: PriceRange) -> PriceRange {
        let min = self.min.clamp(bounds.min, bounds.max);
        let max = self.max.clamp(bounds.min, bounds.max);
        PriceRange::new(min, max)
    }
}

/// The user's choices for one interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub neighbourhood: NeighbourhoodChoice,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}
