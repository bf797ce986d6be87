use super::cache::DatasetSnapshot;
use super::domain::{FilterSelection, Listing, NeighbourhoodColumn, NeighbourhoodLookup};
use super::filter::{AppliedFilter, FilterControls, FilteredView};
use super::map::MapView;
use super::schema::{ListingSchema, SchemaError};
use super::sources::NeighbourhoodBoundaries;
use super::summary::PriceSummary;
use super::table::{TableSort, TableView};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Validated datasets ready to answer filter passes.
#[derive(Debug, Clone)]
pub struct Explorer {
    snapshot: DatasetSnapshot,
    schema: ListingSchema,
    listings: Vec<Listing>,
    controls: FilterControls,
}

impl Explorer {
    pub fn validate(snapshot: DatasetSnapshot) -> Result<Self, SchemaError> {
        let schema = ListingSchema::validate(&snapshot.listings)?;
        let listings = schema.decode(&snapshot.listings)?;
        let controls = FilterControls::derive(&listings, schema.neighbourhood_column());

        if let Some(column) = schema.neighbourhood_column() {
            let unknown = unknown_neighbourhoods(column, &listings, &snapshot.lookup);
            if !unknown.is_empty() {
                debug!(
                    column = column.name(),
                    unknown = unknown.len(),
                    "listing neighbourhoods missing from lookup table"
                );
            }
        }

        debug!(
            listings = listings.len(),
            neighbourhood_column = schema.neighbourhood_column().map(NeighbourhoodColumn::name),
            "listings validated"
        );

        Ok(Self {
            snapshot,
            schema,
            listings,
            controls,
        })
    }

    pub fn controls(&self) -> &FilterControls {
        &self.controls
    }

    pub fn neighbourhood_column(&self) -> Option<&NeighbourhoodColumn> {
        self.schema.neighbourhood_column()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn snapshot(&self) -> &DatasetSnapshot {
        &self.snapshot
    }

    pub fn run(&self, selection: &FilterSelection) -> PassOutcome {
        let Some(filter) = self.controls.resolve(selection) else {
            info!("no listings loaded; nothing to filter");
            return PassOutcome::NoResults { filter: None };
        };

        let Some(view) = filter.apply(&self.listings) else {
            info!(
                neighbourhood = filter.neighbourhood.label(),
                min_price = filter.range.min,
                max_price = filter.range.max,
                "no listings match filters"
            );
            return PassOutcome::NoResults {
                filter: Some(filter),
            };
        };

        // Rounding precedes the summary; both metrics and display use it.
        let view = view.round_predictions();
        let summary = PriceSummary::compute(&view);

        debug!(
            shown = summary.count,
            total = self.listings.len(),
            "filter pass rendered"
        );

        PassOutcome::Rendered(RenderedPass {
            filter,
            view,
            summary,
            boundaries: self.snapshot.boundaries.clone(),
            neighbourhood_column: self.schema.neighbourhood_column().cloned(),
        })
    }
}

/// Listing labels the lookup table does not know. Compared against groups
/// when the detected column is `neighbourhood_group`.
fn unknown_neighbourhoods<'a>(
    column: &NeighbourhoodColumn,
    listings: &'a [Listing],
    lookup: &NeighbourhoodLookup,
) -> BTreeSet<&'a str> {
    if lookup.is_empty() {
        return BTreeSet::new();
    }

    let known: BTreeSet<&str> = if column.name() == "neighbourhood_group" {
        lookup
            .records
            .iter()
            .filter_map(|record| record.group.as_deref())
            .collect()
    } else {
        lookup.names().collect()
    };

    listings
        .iter()
        .filter_map(|listing| listing.neighbourhood.as_deref())
        .filter(|label| !known.contains(label))
        .collect()
}

/// Result of one interaction once filters are applied.
#[derive(Debug, Clone)]
pub enum PassOutcome {
    /// Nothing matched; the page shows a warning and no metrics.
    NoResults { filter: Option<AppliedFilter> },
    Rendered(RenderedPass),
}

impl PassOutcome {
    pub fn filter(&self) -> Option<&AppliedFilter> {
        match self {
            PassOutcome::NoResults { filter } => filter.as_ref(),
            PassOutcome::Rendered(pass) => Some(&pass.filter),
        }
    }

    pub fn rendered(&self) -> Option<&RenderedPass> {
        match self {
            PassOutcome::Rendered(pass) => Some(pass),
            PassOutcome::NoResults { .. } => None,
        }
    }
}

pub const NO_RESULTS_MESSAGE: &str = "No listings match your filters.";

#[derive(Debug, Clone)]
pub struct RenderedPass {
    pub filter: AppliedFilter,
    pub view: FilteredView,
    pub summary: PriceSummary,
    boundaries: Arc<NeighbourhoodBoundaries>,
    neighbourhood_column: Option<NeighbourhoodColumn>,
}

impl RenderedPass {
    pub fn map(&self) -> MapView<'_> {
        MapView::new(
            &self.view,
            &self.boundaries,
            self.neighbourhood_column.is_some(),
        )
    }

    pub fn table(&self, sort: TableSort) -> TableView<'_> {
        TableView::new(&self.view, self.neighbourhood_column.as_ref(), sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::domain::{GeoPoint, ListingId, NeighbourhoodRecord};

    fn listing(id: &str, neighbourhood: &str) -> Listing {
        Listing {
            id: ListingId(id.to_string()),
            name: format!("Home {id}"),
            location: GeoPoint {
                latitude: 52.37,
                longitude: 4.89,
            },
            predicted_price: 120.0,
            price: None,
            neighbourhood: Some(neighbourhood.to_string()),
        }
    }

    fn lookup() -> NeighbourhoodLookup {
        NeighbourhoodLookup {
            records: vec![
                NeighbourhoodRecord {
                    group: Some("Centrum".to_string()),
                    name: "Centrum-West".to_string(),
                },
                NeighbourhoodRecord {
                    group: None,
                    name: "Oud-Oost".to_string(),
                },
            ],
        }
    }

    #[test]
    fn unknown_labels_are_collected_once() {
        let listings = [
            listing("1", "Centrum-West"),
            listing("2", "Zuid"),
            listing("3", "Zuid"),
        ];
        let column = NeighbourhoodColumn("neighbourhood_cleansed");

        let unknown = unknown_neighbourhoods(&column, &listings, &lookup());
        assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec!["Zuid"]);
    }

    #[test]
    fn group_column_is_checked_against_groups() {
        let listings = [listing("1", "Centrum"), listing("2", "Centrum-West")];
        let column = NeighbourhoodColumn("neighbourhood_group");

        let unknown = unknown_neighbourhoods(&column, &listings, &lookup());
        assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec!["Centrum-West"]);
    }

    #[test]
    fn empty_lookup_reports_nothing() {
        let listings = [listing("1", "Zuid")];
        let column = NeighbourhoodColumn("neighbourhood");

        let unknown = unknown_neighbourhoods(&column, &listings, &NeighbourhoodLookup::default());
        assert!(unknown.is_empty());
    }
}
