use super::domain::{Listing, NeighbourhoodColumn};
use super::filter::FilteredView;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableColumn {
    Id,
    Name,
    PredictedPrice,
    Price,
    Latitude,
    Longitude,
    Neighbourhood,
}

impl TableColumn {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "predicted_price" => Some(Self::PredictedPrice),
            "price" => Some(Self::Price),
            "latitude" => Some(Self::Latitude),
            "longitude" => Some(Self::Longitude),
            "neighbourhood" => Some(Self::Neighbourhood),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::PredictedPrice => "predicted_price",
            Self::Price => "price",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Neighbourhood => "neighbourhood",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSort {
    pub column: TableColumn,
    pub direction: SortDirection,
}

impl Default for TableSort {
    fn default() -> Self {
        Self {
            column: TableColumn::PredictedPrice,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableHeader {
    pub column: TableColumn,
    pub label: &'static str,
}

/// Filtered rows restricted to the display columns, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct TableView<'a> {
    pub headers: Vec<TableHeader>,
    pub sort: TableSort,
    pub rows: Vec<&'a Listing>,
}

impl<'a> TableView<'a> {
    pub fn new(
        view: &'a FilteredView,
        neighbourhood_column: Option<&NeighbourhoodColumn>,
        sort: TableSort,
    ) -> Self {
        let mut headers = [
            TableColumn::Id,
            TableColumn::Name,
            TableColumn::PredictedPrice,
            TableColumn::Price,
            TableColumn::Latitude,
            TableColumn::Longitude,
        ]
        .into_iter()
        .map(|column| TableHeader {
            column,
            label: column.key(),
        })
        .collect::<Vec<_>>();

        if let Some(neighbourhood) = neighbourhood_column {
            headers.push(TableHeader {
                column: TableColumn::Neighbourhood,
                label: neighbourhood.name(),
            });
        }

        // Sorting by an undisplayed column falls back to the default order.
        let sort = if headers.iter().any(|header| header.column == sort.column) {
            sort
        } else {
            TableSort::default()
        };

        let mut rows: Vec<&Listing> = view.rows().iter().collect();
        rows.sort_by(|left, right| compare(left, right, sort));

        Self {
            headers,
            sort,
            rows,
        }
    }

    /// Display text for one cell.
    pub fn cell(listing: &Listing, column: TableColumn) -> String {
        match column {
            TableColumn::Id => listing.id.to_string(),
            TableColumn::Name => listing.name.clone(),
            TableColumn::PredictedPrice => format!("{:.0}", listing.predicted_price),
            TableColumn::Price => listing.price.clone().unwrap_or_default(),
            TableColumn::Latitude => listing.location.latitude.to_string(),
            TableColumn::Longitude => listing.location.longitude.to_string(),
            TableColumn::Neighbourhood => listing.neighbourhood.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

fn sort_value(listing: &Listing, column: TableColumn) -> Option<SortValue<'_>> {
    match column {
        TableColumn::Id => Some(
            listing
                .id
                .0
                .parse::<f64>()
                .map(SortValue::Number)
                .unwrap_or(SortValue::Text(&listing.id.0)),
        ),
        TableColumn::Name => Some(SortValue::Text(&listing.name)),
        TableColumn::PredictedPrice => Some(SortValue::Number(listing.predicted_price)),
        TableColumn::Price => listing.price.as_deref().map(|raw| {
            parse_currency(raw)
                .map(SortValue::Number)
                .unwrap_or(SortValue::Text(raw))
        }),
        TableColumn::Latitude => Some(SortValue::Number(listing.location.latitude)),
        TableColumn::Longitude => Some(SortValue::Number(listing.location.longitude)),
        TableColumn::Neighbourhood => listing.neighbourhood.as_deref().map(SortValue::Text),
    }
}

/// `$1,250.00` style list prices sort by their numeric value.
fn parse_currency(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect();
    digits.parse().ok()
}

fn compare(left: &Listing, right: &Listing, sort: TableSort) -> Ordering {
    match (sort_value(left, sort.column), sort_value(right, sort.column)) {
        (Some(left), Some(right)) => {
            let ordering = match (&left, &right) {
                (SortValue::Number(l), SortValue::Number(r)) => l.total_cmp(r),
                _ => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
            };
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
        // Missing values trail in either direction.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
