use price_explorer::config::{DataSourcesConfig, ResolvedSources};
use price_explorer::explorer::{
    DatasetCache, Explorer, FilterSelection, NeighbourhoodChoice, PassOutcome, PriceRange,
    RenderedPass, SchemaError, TableSort,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn sources(listings: &str) -> ResolvedSources {
    DataSourcesConfig {
        listings: fixture(listings),
        neighbourhoods: fixture("neighbourhoods.csv"),
        boundaries: fixture("neighbourhoods.geojson"),
        model: Some(fixture("model.bin")),
    }
    .resolve()
    .expect("fixtures resolve")
}

fn explorer(listings: &str) -> Explorer {
    let snapshot = DatasetCache::new()
        .snapshot(&sources(listings))
        .expect("fixtures load");
    Explorer::validate(snapshot).expect("fixture schema is valid")
}

fn rendered(outcome: PassOutcome) -> RenderedPass {
    match outcome {
        PassOutcome::Rendered(pass) => pass,
        PassOutcome::NoResults { .. } => panic!("expected listings to match"),
    }
}

fn neighbourhood(name: &str) -> FilterSelection {
    FilterSelection {
        neighbourhood: NeighbourhoodChoice::Exact(name.to_string()),
        ..FilterSelection::default()
    }
}

#[test]
fn default_pass_clips_to_derived_bounds() {
    let explorer = explorer("listings.csv");
    let controls = explorer.controls();

    assert_eq!(controls.bounds, Some(PriceRange { min: 58, max: 849 }));
    assert_eq!(
        controls.neighbourhoods.as_deref(),
        Some(
            &[
                "Centrum-West".to_string(),
                "De Pijp - Rivierenbuurt".to_string(),
                "Oud-Oost".to_string(),
            ][..]
        )
    );

    let pass = rendered(explorer.run(&FilterSelection::default()));
    assert_eq!(pass.summary.count, 7, "the 890 outlier sits above p99");
    assert!(pass.view.len() <= explorer.listings().len());
    assert_eq!(pass.summary.mean_label(), "158.14");
    assert_eq!(pass.summary.median_label(), "142.00");
}

#[test]
fn filtered_rows_stay_within_selected_range() {
    let explorer = explorer("listings.csv");
    let selection = FilterSelection {
        min_price: Some(100),
        max_price: Some(200),
        ..FilterSelection::default()
    };

    let pass = rendered(explorer.run(&selection));
    assert_eq!(pass.filter.range, PriceRange { min: 100, max: 200 });
    assert!(pass
        .view
        .predicted_prices()
        .all(|price| (100.0..=200.0).contains(&price)));
    assert_eq!(pass.summary.count, 5);
}

#[test]
fn neighbourhood_selection_keeps_only_that_label() {
    let explorer = explorer("listings.csv");
    let pass = rendered(explorer.run(&neighbourhood("Centrum-West")));

    assert!(pass
        .view
        .rows()
        .iter()
        .all(|row| row.neighbourhood.as_deref() == Some("Centrum-West")));
    assert_eq!(pass.summary.count, 3);
    assert_eq!(pass.summary.mean_label(), "217.00");
    assert_eq!(pass.summary.median_label(), "199.00");
}

#[test]
fn neighbourhood_without_matches_reports_no_results() {
    let explorer = explorer("listings.csv");

    match explorer.run(&neighbourhood("Zuid")) {
        PassOutcome::NoResults { filter } => {
            let filter = filter.expect("bounds were derived");
            assert_eq!(filter.neighbourhood.label(), "Zuid");
        }
        PassOutcome::Rendered(_) => panic!("Zuid has no listings"),
    }

    let priced_out = FilterSelection {
        neighbourhood: NeighbourhoodChoice::Exact("De Pijp - Rivierenbuurt".to_string()),
        min_price: Some(150),
        max_price: None,
    };
    assert!(explorer.run(&priced_out).rendered().is_none());
}

#[test]
fn predicted_prices_are_rounded_before_display_and_summary() {
    let explorer = explorer("listings_without_neighbourhood.csv");
    let pass = rendered(explorer.run(&FilterSelection::default()));

    assert!(pass.view.is_rounded());
    assert_eq!(
        pass.view.predicted_prices().collect::<Vec<_>>(),
        vec![80.0, 81.0, 300.0, 300.0]
    );
    // 190.45 if the raw predictions were averaged.
    assert_eq!(pass.summary.mean_label(), "190.25");
    assert_eq!(pass.summary.median_label(), "190.50");
}

#[test]
fn map_draws_every_boundary_and_one_marker_per_row() {
    let explorer = explorer("listings.csv");
    let boundary_count = explorer.snapshot().boundaries.len();

    for selection in [
        FilterSelection::default(),
        neighbourhood("Oud-Oost"),
        neighbourhood("Centrum-West"),
    ] {
        let pass = rendered(explorer.run(&selection));
        let map = pass.map();
        assert_eq!(map.markers().count(), pass.view.len());
        assert_eq!(map.marker_count(), pass.summary.count);
        assert_eq!(map.overlay.polygon_count(), boundary_count);
        assert_eq!(boundary_count, 3);
    }
}

#[test]
fn map_centres_on_filtered_listings() {
    let explorer = explorer("listings_without_neighbourhood.csv");
    let pass = rendered(explorer.run(&FilterSelection::default()));
    let map = pass.map();

    assert!((map.center.latitude - 52.37).abs() < 1e-9);
    assert!((map.center.longitude - 4.9).abs() < 1e-9);
    let popup = map.markers().next().expect("marker").popup;
    assert_eq!(popup.neighbourhood, None);
}

#[test]
fn table_lists_rows_by_descending_prediction() {
    let explorer = explorer("listings.csv");
    let pass = rendered(explorer.run(&FilterSelection::default()));
    let table = pass.table(TableSort::default());

    let ids: Vec<&str> = table.rows.iter().map(|row| row.id.0.as_str()).collect();
    assert_eq!(
        ids,
        vec!["44391", "20168", "28871", "2818", "27886", "25428", "29051"]
    );
    let labels: Vec<&str> = table.headers.iter().map(|header| header.label).collect();
    assert_eq!(
        labels,
        vec![
            "id",
            "name",
            "predicted_price",
            "price",
            "latitude",
            "longitude",
            "neighbourhood_cleansed"
        ]
    );
}

#[test]
fn missing_latitude_halts_before_any_view() {
    let snapshot = DatasetCache::new()
        .snapshot(&sources("listings_missing_latitude.csv"))
        .expect("file itself loads");

    let error = Explorer::validate(snapshot).expect_err("latitude is required");
    assert_eq!(error, SchemaError::MissingColumn("latitude"));
    assert!(error.to_string().contains("latitude"));
}

#[test]
fn header_only_table_has_no_bounds_and_no_results() {
    let explorer = explorer("listings_empty.csv");

    assert!(explorer.listings().is_empty());
    assert_eq!(explorer.controls().bounds, None);
    assert_eq!(
        explorer.controls().neighbourhoods.as_deref().map(<[String]>::is_empty),
        Some(true)
    );

    for selection in [
        FilterSelection::default(),
        neighbourhood("Centrum-West"),
        FilterSelection {
            min_price: Some(0),
            max_price: Some(1_000),
            ..FilterSelection::default()
        },
    ] {
        match explorer.run(&selection) {
            PassOutcome::NoResults { filter } => assert!(filter.is_none()),
            PassOutcome::Rendered(_) => panic!("an empty table cannot render"),
        }
    }
}

#[test]
fn snapshot_reuses_cached_datasets() {
    let cache = DatasetCache::new();
    let sources = sources("listings.csv");

    let first = cache.snapshot(&sources).expect("load");
    let second = cache.snapshot(&sources).expect("cached");
    assert!(Arc::ptr_eq(&first.listings, &second.listings));
    assert!(Arc::ptr_eq(&first.boundaries, &second.boundaries));
    assert_eq!(
        second.model.as_ref().map(|model| model.file_name()),
        Some("model.bin".to_string())
    );

    assert!(cache.invalidate(&sources.listings));
    let third = cache.snapshot(&sources).expect("reload");
    assert!(!Arc::ptr_eq(&first.listings, &third.listings));
    assert!(Arc::ptr_eq(&first.lookup, &third.lookup));
}
