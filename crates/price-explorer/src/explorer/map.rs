use super::domain::{GeoPoint, Listing};
use super::filter::FilteredView;
use super::sources::NeighbourhoodBoundaries;
use serde::Serialize;

pub const INITIAL_ZOOM: u8 = 12;
pub const BASEMAP_TILES: &str = "CartoDB positron";
pub const BOUNDARY_LAYER_NAME: &str = "Neighbourhoods";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlineStyle {
    pub color: &'static str,
    pub weight: u8,
    #[serde(rename = "fillOpacity")]
    pub fill_opacity: f32,
}

pub const BOUNDARY_STYLE: OutlineStyle = OutlineStyle {
    color: "#000000",
    weight: 1,
    fill_opacity: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub radius: u8,
    pub color: &'static str,
    pub fill: bool,
    #[serde(rename = "fillOpacity")]
    pub fill_opacity: f32,
}

pub const LISTING_MARKER_STYLE: MarkerStyle = MarkerStyle {
    radius: 6,
    color: "#ff6600",
    fill: true,
    fill_opacity: 0.8,
};

/// All neighbourhood outlines, regardless of the active filter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoundaryOverlay<'a> {
    pub name: &'static str,
    pub style: OutlineStyle,
    #[serde(rename = "data")]
    pub boundaries: &'a NeighbourhoodBoundaries,
}

impl BoundaryOverlay<'_> {
    pub fn polygon_count(&self) -> usize {
        self.boundaries.len()
    }
}

/// Text shown when a listing marker is opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPopup<'a> {
    pub name: &'a str,
    pub id: &'a str,
    pub predicted_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<&'a str>,
}

impl MarkerPopup<'_> {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.name.to_string(),
            format!("ID: {}", self.id),
            format!("Predicted Price: {}", self.predicted_price),
        ];
        if let Some(neighbourhood) = self.neighbourhood {
            lines.push(neighbourhood.to_string());
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor<'a> {
    pub position: GeoPoint,
    pub popup: MarkerPopup<'a>,
}

pub fn format_currency(value: f64) -> String {
    format!("€{value:.2}")
}

/// Map for one pass: centre, boundary overlay and the filtered listings.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    pub center: GeoPoint,
    pub zoom: u8,
    pub tiles: &'static str,
    pub overlay: BoundaryOverlay<'a>,
    pub marker_style: MarkerStyle,
    rows: &'a [Listing],
    show_neighbourhood: bool,
}

impl<'a> MapView<'a> {
    pub fn new(
        view: &'a FilteredView,
        boundaries: &'a NeighbourhoodBoundaries,
        show_neighbourhood: bool,
    ) -> Self {
        let rows = view.rows();
        let count = rows.len() as f64;
        let (lat_sum, lon_sum) = rows.iter().fold((0.0, 0.0), |(lat, lon), row| {
            (lat + row.location.latitude, lon + row.location.longitude)
        });

        Self {
            center: GeoPoint {
                latitude: lat_sum / count,
                longitude: lon_sum / count,
            },
            zoom: INITIAL_ZOOM,
            tiles: BASEMAP_TILES,
            overlay: BoundaryOverlay {
                name: BOUNDARY_LAYER_NAME,
                style: BOUNDARY_STYLE,
                boundaries,
            },
            marker_style: LISTING_MARKER_STYLE,
            rows,
            show_neighbourhood,
        }
    }

    /// One marker per filtered listing, built on demand. Each call starts over.
    pub fn markers(&self) -> impl Iterator<Item = MarkerDescriptor<'a>> + 'a {
        let show_neighbourhood = self.show_neighbourhood;
        let rows = self.rows;
        rows.iter().map(move |row| MarkerDescriptor {
            position: row.location,
            popup: MarkerPopup {
                name: &row.name,
                id: &row.id.0,
                predicted_price: format_currency(row.predicted_price),
                neighbourhood: if show_neighbourhood {
                    row.neighbourhood.as_deref()
                } else {
                    None
                },
            },
        })
    }

    pub fn marker_count(&self) -> usize {
        self.rows.len()
    }
}
