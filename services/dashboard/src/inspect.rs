use crate::infra::{parse_sort_column, parse_sort_direction};
use clap::Args;
use price_explorer::config::AppConfig;
use price_explorer::error::AppError;
use price_explorer::explorer::{
    DatasetCache, Explorer, FilterSelection, NeighbourhoodChoice, PassOutcome, SortDirection,
    TableColumn, TableSort, TableView, NO_RESULTS_MESSAGE,
};

#[derive(Args, Debug, Default)]
pub(crate) struct InspectArgs {
    /// Neighbourhood to keep (defaults to all)
    #[arg(long)]
    pub(crate) neighbourhood: Option<String>,
    /// Lower predicted price bound (defaults to the dataset minimum)
    #[arg(long)]
    pub(crate) min_price: Option<i64>,
    /// Upper predicted price bound (defaults to the 99th percentile)
    #[arg(long)]
    pub(crate) max_price: Option<i64>,
    /// Number of table rows to print
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: usize,
    /// Table column to sort by
    #[arg(long, value_parser = parse_sort_column)]
    pub(crate) sort: Option<TableColumn>,
    /// Sort direction (asc or desc)
    #[arg(long, value_parser = parse_sort_direction)]
    pub(crate) direction: Option<SortDirection>,
}

impl InspectArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection {
            neighbourhood: NeighbourhoodChoice::parse(self.neighbourhood.as_deref()),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    fn table_sort(&self) -> TableSort {
        let default = TableSort::default();
        TableSort {
            column: self.sort.unwrap_or(default.column),
            direction: self.direction.unwrap_or(default.direction),
        }
    }
}

pub(crate) fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let sources = config.sources.resolve()?;
    let snapshot = DatasetCache::global().snapshot(&sources)?;
    let explorer = Explorer::validate(snapshot)?;

    let outcome = explorer.run(&args.selection());
    for line in render_inspection(
        &config.dashboard.title,
        &explorer,
        &outcome,
        args.table_sort(),
        args.limit,
    ) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_inspection(
    title: &str,
    explorer: &Explorer,
    outcome: &PassOutcome,
    sort: TableSort,
    limit: usize,
) -> Vec<String> {
    let mut lines = vec![title.to_string()];
    let controls = explorer.controls();

    lines.push(format!("Listings loaded: {}", explorer.listings().len()));
    match (explorer.neighbourhood_column(), &controls.neighbourhoods) {
        (Some(column), Some(options)) => {
            lines.push(format!("Neighbourhood column: {}", column.name()));
            lines.push(format!(
                "Neighbourhood options: {}, {}",
                NeighbourhoodChoice::ALL_LABEL,
                options.join(", ")
            ));
        }
        _ => lines.push("Neighbourhood column: none".to_string()),
    }
    if let Some(bounds) = controls.bounds {
        lines.push(format!("Price bounds: €{} - €{}", bounds.min, bounds.max));
    }
    if let Some(model) = &explorer.snapshot().model {
        lines.push(format!(
            "Model artifact: {} ({} bytes)",
            model.file_name(),
            model.size_bytes()
        ));
    }

    if let Some(filter) = outcome.filter() {
        lines.push(format!(
            "\nFilter: neighbourhood {}, predicted price €{} - €{}",
            filter.neighbourhood.label(),
            filter.range.min,
            filter.range.max
        ));
    }

    let Some(pass) = outcome.rendered() else {
        lines.push(format!("\n{NO_RESULTS_MESSAGE}"));
        return lines;
    };

    lines.push(format!("\nListings shown: {}", pass.summary.count));
    lines.push(format!("Avg predicted price (€): {}", pass.summary.mean_label()));
    lines.push(format!(
        "Median predicted price (€): {}",
        pass.summary.median_label()
    ));

    let map = pass.map();
    lines.push(format!(
        "Map: centre ({:.5}, {:.5}), {} markers, {} boundary polygons",
        map.center.latitude,
        map.center.longitude,
        map.marker_count(),
        map.overlay.polygon_count()
    ));

    let table = pass.table(sort);
    lines.push(format!(
        "\nTop listings by {} ({})",
        table.sort.column.key(),
        table.sort.direction.key()
    ));
    lines.push(
        table
            .headers
            .iter()
            .map(|header| header.label)
            .collect::<Vec<_>>()
            .join(" | "),
    );
    for row in table.rows.iter().take(limit) {
        let cells: Vec<String> = table
            .headers
            .iter()
            .map(|header| TableView::cell(row, header.column))
            .collect();
        lines.push(format!("- {}", cells.join(" | ")));
    }
    if table.rows.len() > limit {
        lines.push(format!("... {} more", table.rows.len() - limit));
    }

    lines
}
