use metrics_exporter_prometheus::PrometheusHandle;
use price_explorer::config::ResolvedSources;
use price_explorer::explorer::{
    DatasetCache, FilterSelection, NeighbourhoodChoice, SortDirection, TableColumn, TableSort,
};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) sources: Arc<ResolvedSources>,
    pub(crate) title: Arc<str>,
    pub(crate) cache: &'static DatasetCache,
}

/// Dashboard controls as they arrive from the sidebar form.
///
/// Everything is taken as text: an emptied number input submits `min_price=`
/// and should mean "no bound" rather than a rejected request.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    pub(crate) neighbourhood: Option<String>,
    #[serde(default)]
    pub(crate) min_price: Option<String>,
    #[serde(default)]
    pub(crate) max_price: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<String>,
    #[serde(default)]
    pub(crate) direction: Option<String>,
}

impl DashboardQuery {
    pub(crate) fn selection(&self) -> FilterSelection {
        FilterSelection {
            neighbourhood: NeighbourhoodChoice::parse(self.neighbourhood.as_deref()),
            min_price: self.min_price.as_deref().and_then(parse_price_bound),
            max_price: self.max_price.as_deref().and_then(parse_price_bound),
        }
    }

    pub(crate) fn sort(&self) -> TableSort {
        let default = TableSort::default();
        TableSort {
            column: self
                .sort
                .as_deref()
                .and_then(TableColumn::parse)
                .unwrap_or(default.column),
            direction: self
                .direction
                .as_deref()
                .and_then(SortDirection::parse)
                .unwrap_or(default.direction),
        }
    }
}

/// Whole-currency bound; fractional input is truncated like the slider would.
pub(crate) fn parse_price_bound(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
}

pub(crate) fn parse_sort_column(raw: &str) -> Result<TableColumn, String> {
    TableColumn::parse(raw).ok_or_else(|| {
        format!(
            "unknown column '{raw}' (expected id, name, predicted_price, price, latitude, longitude or neighbourhood)"
        )
    })
}

pub(crate) fn parse_sort_direction(raw: &str) -> Result<SortDirection, String> {
    SortDirection::parse(raw).ok_or_else(|| format!("unknown direction '{raw}' (expected asc or desc)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_bounds_are_ignored() {
        let query = DashboardQuery {
            neighbourhood: Some("All".to_string()),
            min_price: Some(String::new()),
            max_price: Some(" 250 ".to_string()),
            ..DashboardQuery::default()
        };

        let selection = query.selection();
        assert_eq!(selection.neighbourhood, NeighbourhoodChoice::All);
        assert_eq!(selection.min_price, None);
        assert_eq!(selection.max_price, Some(250));
    }

    #[test]
    fn price_bounds_accept_decimals_and_reject_text() {
        assert_eq!(parse_price_bound("120.9"), Some(120));
        assert_eq!(parse_price_bound("cheap"), None);
        assert_eq!(parse_price_bound("NaN"), None);
    }

    #[test]
    fn unknown_sort_keys_fall_back_to_default() {
        let query = DashboardQuery {
            sort: Some("rating".to_string()),
            direction: Some("asc".to_string()),
            ..DashboardQuery::default()
        };

        let sort = query.sort();
        assert_eq!(sort.column, TableColumn::PredictedPrice);
        assert_eq!(sort.direction, SortDirection::Ascending);
        assert!(parse_sort_column("rating").is_err());
        assert_eq!(parse_sort_direction("DESC"), Ok(SortDirection::Descending));
    }
}
