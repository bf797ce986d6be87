use maud::{html, Markup, PreEscaped, DOCTYPE};
use price_explorer::error::AppError;
use price_explorer::explorer::{
    AppliedFilter, Explorer, FilterControls, MapView, MarkerDescriptor, NeighbourhoodChoice, PassOutcome,
    PriceSummary, SchemaError, SortDirection, TableColumn, TableSort, TableView,
    NO_RESULTS_MESSAGE,
};
use serde::ser::{Serialize, Serializer};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

const PAGE_STYLE: &str = "
body { margin: 0; font-family: system-ui, sans-serif; color: #1f2933; }
.page { display: flex; min-height: 100vh; }
aside { width: 260px; padding: 1.5rem; background: #f5f7fa; border-right: 1px solid #e4e7eb; }
aside label { display: block; margin: 1rem 0 0.25rem; font-weight: 600; }
aside select, aside input { width: 100%; box-sizing: border-box; }
main { flex: 1; padding: 1.5rem 2rem; }
.metrics { display: flex; gap: 2rem; margin: 1rem 0; }
.metric .value { font-size: 1.8rem; }
.banner { padding: 0.75rem 1rem; border-radius: 4px; margin: 1rem 0; }
.banner.warning { background: #fff8e1; border: 1px solid #f5c518; }
.banner.error { background: #fdecea; border: 1px solid #e53935; }
#map { height: 600px; margin: 1rem 0; }
table.listings { border-collapse: collapse; width: 100%; }
table.listings th, table.listings td { padding: 0.3rem 0.6rem; border-bottom: 1px solid #e4e7eb; text-align: left; }
footer { margin-top: 2rem; color: #7b8794; font-size: 0.85rem; }
";

pub(crate) fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(LEAFLET_CSS);
                script src=(LEAFLET_JS) {}
                style { (PreEscaped(PAGE_STYLE)) }
            }
            body { (content) }
        }
    }
}

pub(crate) fn schema_error_page(title: &str, error: &SchemaError) -> Markup {
    layout(
        title,
        html! {
            main {
                h1 { (title) }
                div class="banner error" role="alert" { (error.to_string()) }
            }
        },
    )
}

pub(crate) fn dashboard_page(
    title: &str,
    explorer: &Explorer,
    outcome: &PassOutcome,
    sort: TableSort,
) -> Result<Markup, AppError> {
    let body = match outcome.rendered() {
        None => html! {
            div class="banner warning" role="status" { (NO_RESULTS_MESSAGE) }
        },
        Some(pass) => {
            let map = map_panel(&pass.map())?;
            let table = pass.table(sort);
            html! {
                (metrics_row(&pass.summary))
                hr;
                h2 { "Map of Predicted Listings" }
                (map)
                h2 { "Filtered Listings" }
                (listings_table(&table, &pass.filter))
            }
        }
    };

    Ok(layout(
        title,
        html! {
            div class="page" {
                (sidebar(explorer.controls(), outcome.filter(), sort))
                main {
                    h1 { (title) }
                    p { "Map of listings with " strong { "predicted prices" } ", neighbourhood filters, and geo-boundaries." }
                    (body)
                    (footer(explorer))
                }
            }
        },
    ))
}

fn sidebar(controls: &FilterControls, filter: Option<&AppliedFilter>, sort: TableSort) -> Markup {
    let selected = filter
        .map(|filter| filter.neighbourhood.label())
        .unwrap_or(NeighbourhoodChoice::ALL_LABEL);

    html! {
        aside {
            h2 { "Filters" }
            form method="get" action="/" {
                @if let Some(options) = &controls.neighbourhoods {
                    label for="neighbourhood" { "Neighbourhood" }
                    select id="neighbourhood" name="neighbourhood" {
                        option value=(NeighbourhoodChoice::ALL_LABEL) selected[selected == NeighbourhoodChoice::ALL_LABEL] {
                            (NeighbourhoodChoice::ALL_LABEL)
                        }
                        @for name in options {
                            option value=(name) selected[selected == name.as_str()] { (name) }
                        }
                    }
                }
                @if let Some(bounds) = controls.bounds {
                    @let range = filter.map(|filter| filter.range).unwrap_or(bounds);
                    label for="min_price" { "Predicted price range (€)" }
                    input id="min_price" type="number" name="min_price" step="1"
                        min=(bounds.min) max=(bounds.max) value=(range.min);
                    input id="max_price" type="number" name="max_price" step="1"
                        min=(bounds.min) max=(bounds.max) value=(range.max);
                }
                input type="hidden" name="sort" value=(sort.column.key());
                input type="hidden" name="direction" value=(sort.direction.key());
                p { button type="submit" { "Apply filters" } }
            }
        }
    }
}

fn metrics_row(summary: &PriceSummary) -> Markup {
    html! {
        div class="metrics" {
            (metric("Listings shown", &summary.count.to_string()))
            (metric("Avg predicted price (€)", &summary.mean_label()))
            (metric("Median predicted price (€)", &summary.median_label()))
        }
    }
}

fn metric(label: &str, value: &str) -> Markup {
    html! {
        div class="metric" {
            div class="label" { (label) }
            div class="value" { (value) }
        }
    }
}

/// Leaflet tile template and attribution for a named basemap.
fn tile_source(name: &str) -> (&'static str, &'static str) {
    match name {
        "CartoDB positron" => (
            "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
            "&copy; OpenStreetMap contributors &copy; CARTO",
        ),
        _ => (
            "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            "&copy; OpenStreetMap contributors",
        ),
    }
}

#[derive(serde::Serialize)]
struct MarkerPayload {
    lat: f64,
    lon: f64,
    popup: String,
}

impl From<MarkerDescriptor<'_>> for MarkerPayload {
    fn from(marker: MarkerDescriptor<'_>) -> Self {
        let lines = marker.popup.lines();
        let popup = html! {
            @for (index, line) in lines.iter().enumerate() {
                @if index == 0 {
                    b { (line) }
                } @else {
                    br;
                    (line)
                }
            }
        };
        Self {
            lat: marker.position.latitude,
            lon: marker.position.longitude,
            popup: popup.into_string(),
        }
    }
}

/// Streams one payload per marker into the page script.
struct MarkerPayloads<'a>(MapView<'a>);

impl Serialize for MarkerPayloads<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.markers().map(MarkerPayload::from))
    }
}

/// JSON safe to inline inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    let json = serde_json::to_string(value).map_err(std::io::Error::from)?;
    Ok(json.replace("</", "<\\/").replace("<!--", "<\\!--"))
}

fn map_panel(map: &MapView<'_>) -> Result<Markup, AppError> {
    let (tiles, attribution) = tile_source(map.tiles);
    let script = format!(
        "(function () {{
  const map = L.map('map').setView([{lat}, {lon}], {zoom});
  L.tileLayer({tiles}, {{ maxZoom: 19, attribution: {attribution} }}).addTo(map);
  const overlay = {overlay};
  const outlines = L.geoJSON(overlay.data, {{ style: overlay.style }}).addTo(map);
  const markerStyle = {marker_style};
  const listings = L.layerGroup({markers}.map(function (m) {{
    return L.circleMarker([m.lat, m.lon], markerStyle).bindPopup(m.popup);
  }})).addTo(map);
  const layers = {{}};
  layers[overlay.name] = outlines;
  L.control.layers(null, layers).addTo(map);
}})();",
        lat = map.center.latitude,
        lon = map.center.longitude,
        zoom = map.zoom,
        tiles = script_json(&tiles)?,
        attribution = script_json(&attribution)?,
        overlay = script_json(&map.overlay)?,
        marker_style = script_json(&map.marker_style)?,
        markers = script_json(&MarkerPayloads(*map))?,
    );

    Ok(html! {
        div id="map" data-markers=(map.marker_count()) data-boundaries=(map.overlay.polygon_count()) {}
        script { (PreEscaped(script)) }
    })
}

fn listings_table(table: &TableView<'_>, filter: &AppliedFilter) -> Markup {
    html! {
        table class="listings" {
            thead {
                tr {
                    @for header in &table.headers {
                        @let active = header.column == table.sort.column;
                        @let next = if active { table.sort.direction.reversed() } else { SortDirection::Descending };
                        th aria-sort=[active.then(|| aria_sort(table.sort.direction))] {
                            a href=(sort_href(filter, header.column, next)) {
                                (header.label)
                                @if active {
                                    " " (sort_marker(table.sort.direction))
                                }
                            }
                        }
                    }
                }
            }
            tbody {
                @for row in &table.rows {
                    tr {
                        @for header in &table.headers {
                            td { (TableView::cell(row, header.column)) }
                        }
                    }
                }
            }
        }
    }
}

fn aria_sort(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    }
}

fn sort_marker(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    }
}

/// Link that re-sorts the table while keeping the active filters.
fn sort_href(filter: &AppliedFilter, column: TableColumn, direction: SortDirection) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("neighbourhood", filter.neighbourhood.label())
        .append_pair("min_price", &filter.range.min.to_string())
        .append_pair("max_price", &filter.range.max.to_string())
        .append_pair("sort", column.key())
        .append_pair("direction", direction.key())
        .finish();
    format!("/?{query}")
}

fn footer(explorer: &Explorer) -> Markup {
    let snapshot = explorer.snapshot();
    html! {
        footer {
            "Listings loaded " (snapshot.listings.loaded_at().format("%Y-%m-%d %H:%M UTC"))
            " · " (snapshot.lookup.len()) " neighbourhoods in lookup"
            @if let Some(model) = &snapshot.model {
                " · model " (model.file_name()) " (" (model.size_bytes()) " bytes)"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use price_explorer::explorer::PriceRange;

    #[test]
    fn sort_links_keep_filters_and_encode_labels() {
        let filter = AppliedFilter {
            neighbourhood: NeighbourhoodChoice::Exact("De Pijp - Rivierenbuurt".to_string()),
            range: PriceRange { min: 60, max: 400 },
        };

        let href = sort_href(&filter, TableColumn::Name, SortDirection::Ascending);
        assert_eq!(
            href,
            "/?neighbourhood=De+Pijp+-+Rivierenbuurt&min_price=60&max_price=400&sort=name&direction=asc"
        );
    }

    #[test]
    fn inline_json_cannot_close_the_script() {
        let json = script_json(&"</script><!--").expect("serialises");
        assert!(!json.contains("</"));
        assert!(!json.contains("<!--"));
    }

    #[test]
    fn error_page_shows_only_the_banner() {
        let page = schema_error_page("Explorer", &SchemaError::MissingColumn("latitude"))
            .into_string();
        assert!(page.contains("Required column `latitude` missing in dataset!"));
        assert!(!page.contains("id=\"map\""));
        assert!(!page.contains("<table"));
    }
}
