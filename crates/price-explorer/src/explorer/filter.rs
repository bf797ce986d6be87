use super::domain::{FilterSelection, Listing, NeighbourhoodChoice, NeighbourhoodColumn, PriceRange};
use serde::Serialize;
use std::collections::BTreeSet;

/// Quantile used for the default (and maximum) upper price bound.
pub const UPPER_BOUND_QUANTILE: f64 = 0.99;

/// Selector values offered for the loaded listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterControls {
    /// `None` when the table has no neighbourhood column.
    pub neighbourhoods: Option<Vec<String>>,
    /// `None` when there are no listings to derive a range from.
    pub bounds: Option<PriceRange>,
}

impl FilterControls {
    pub fn derive(listings: &[Listing], column: Option<&NeighbourhoodColumn>) -> Self {
        let neighbourhoods = column.map(|_| {
            listings
                .iter()
                .filter_map(|listing| listing.neighbourhood.as_deref())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        });

        let mut prices: Vec<f64> = listings.iter().map(|listing| listing.predicted_price).collect();
        prices.sort_by(f64::total_cmp);

        let bounds = match (prices.first(), quantile(&prices, UPPER_BOUND_QUANTILE)) {
            (Some(min), Some(upper)) => Some(PriceRange::new(min.floor() as i64, upper.trunc() as i64)),
            _ => None,
        };

        Self {
            neighbourhoods,
            bounds,
        }
    }

    pub fn offers_neighbourhoods(&self) -> bool {
        self.neighbourhoods.is_some()
    }

    /// Turns a raw selection into the filter actually applied.
    ///
    /// Requested bounds never widen past the derived range; absent bounds fall
    /// back to it. A neighbourhood choice is ignored when there is no column.
    pub fn resolve(&self, selection: &FilterSelection) -> Option<AppliedFilter> {
        let bounds = self.bounds?;
        let requested = PriceRange::new(
            selection.min_price.unwrap_or(bounds.min),
            selection.max_price.unwrap_or(bounds.max),
        );

        let neighbourhood = if self.offers_neighbourhoods() {
            selection.neighbourhood.clone()
        } else {
            NeighbourhoodChoice::All
        };

        Some(AppliedFilter {
            neighbourhood,
            range: requested.clamp_to(bounds),
        })
    }
}

/// Linear interpolation between closest ranks over ascending `sorted`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFilter {
    #[serde(serialize_with = "serialize_choice")]
    pub neighbourhood: NeighbourhoodChoice,
    pub range: PriceRange,
}

fn serialize_choice<S>(choice: &NeighbourhoodChoice, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(choice.label())
}

impl AppliedFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.range.contains(listing.predicted_price)
            && self.neighbourhood.matches(listing.neighbourhood.as_deref())
    }

    pub fn apply(&self, listings: &[Listing]) -> Option<FilteredView> {
        let rows: Vec<Listing> = listings
            .iter()
            .filter(|listing| self.matches(listing))
            .cloned()
            .collect();

        FilteredView::new(rows)
    }
}

/// Non-empty subset of listings matched by one pass's filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    rows: Vec<Listing>,
    rounded: bool,
}

impl FilteredView {
    pub fn new(rows: Vec<Listing>) -> Option<Self> {
        if rows.is_empty() {
            None
        } else {
            Some(Self {
                rows,
                rounded: false,
            })
        }
    }

    /// Rounds predicted prices to whole units, ties to even. Summary and
    /// display both read the rounded values.
    pub fn round_predictions(mut self) -> Self {
        if !self.rounded {
            for row in &mut self.rows {
                row.predicted_price = row.predicted_price.round_ties_even();
            }
            self.rounded = true;
        }
        self
    }

    pub fn is_rounded(&self) -> bool {
        self.rounded
    }

    pub fn rows(&self) -> &[Listing] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn predicted_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|row| row.predicted_price)
    }
}
