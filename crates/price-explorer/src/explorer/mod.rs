//! Load → validate → filter → summarise → map/table, once per interaction.

mod cache;
pub mod domain;
pub mod filter;
pub mod map;
mod pipeline;
pub mod schema;
pub mod sources;
pub mod summary;
pub mod table;

pub use cache::{DatasetCache, DatasetSnapshot, SourceCache, SourceStamp};
pub use domain::{FilterSelection, Listing, NeighbourhoodChoice, PriceRange};
pub use filter::{AppliedFilter, FilterControls, FilteredView};
pub use map::{MapView, MarkerDescriptor};
pub use pipeline::{Explorer, PassOutcome, RenderedPass, NO_RESULTS_MESSAGE};
pub use schema::{ListingSchema, SchemaError};
pub use sources::LoadError;
pub use summary::PriceSummary;
pub use table::{SortDirection, TableColumn, TableSort, TableView};
