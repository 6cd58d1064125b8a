//! End-to-end pipeline test: raw CSVs in, aggregator run, presenter
//! queries over the real artifacts.

use reviewflow_core::{
    aggregate,
    config::PipelineConfig,
    presenter::{FeatureDetail, FilterSelection, Presenter},
    types::{ALL_TIME, UNDATED, WITHIN_TWO_WEEKS},
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Three features, nine reviews (one empty, one unmatched), and a small
/// labeled set with three obvious clusters.
fn setup() -> (TempDir, PipelineConfig) {
    let dir = TempDir::new().unwrap();

    let features = write(
        &dir,
        "Features1.csv",
        "Feature Id,Feature Title,Release Date,App\n\
         F1,Dark Mode,2023-12-25,Notes\n\
         F2,Cloud Sync,2024-02-01,Notes\n\
         F3,Mystery Feature,,Other\n",
    );
    let reviews = write(
        &dir,
        "AppReviews.csv",
        "MatchedFeatureID,Date,ReviewText,App\n\
         F1,2024-01-01,love the dark mode so much,Notes\n\
         F1,2024-01-20,dark mode crashes on my phone,Notes\n\
         F1,2024-04-02,please add dark mode scheduling,Notes\n\
         F2,2024-02-05,sync crashes and loses my notes,Notes\n\
         F2,2024-02-10,cloud sync works great love it,Notes\n\
         F2,2024-05-15,sync is great,Notes\n\
         F1,2024-03-01,   ,Notes\n\
         F9,2024-03-02,review for a feature nobody knows,Notes\n\
         F3,not-a-date,mystery crashes sometimes,Other\n",
    );
    let labeled = write(
        &dir,
        "Labeled_Reviews.csv",
        "Review text,Cluster\n\
         app crashes constantly,Bugs\n\
         crashes on startup again,Bugs\n\
         keeps crashing and loses data,Bugs\n\
         love this great app,Praise\n\
         works great love the design,Praise\n\
         great and beautiful love it,Praise\n\
         please add folders,Requests\n\
         please add widgets support,Requests\n\
         would love scheduling please add,Requests\n",
    );

    let config = PipelineConfig {
        features,
        reviews,
        labeled,
        data_dir: dir.path().join("out"),
    };
    (dir, config)
}

#[test]
fn aggregate_writes_both_artifacts() {
    let (_dir, config) = setup();
    let summary = aggregate::run(&config).unwrap();

    // One empty-text review dropped
    assert_eq!(summary.reviews_total, 9);
    assert_eq!(summary.reviews_kept, 8);
    assert_eq!(summary.clusters, 3);

    assert!(config.flow_table_path().exists());
    assert!(config.enriched_table_path().exists());
}

#[test]
fn all_time_counts_match_kept_reviews_per_feature() {
    let (_dir, config) = setup();
    aggregate::run(&config).unwrap();
    let flows = reviewflow_core::data::load_flow_table(&config.flow_table_path()).unwrap();

    // Dark Mode kept 3 reviews, Cloud Sync 3, Mystery Feature 1
    for (title, expected) in [("Dark Mode", 3), ("Cloud Sync", 3), ("Mystery Feature", 1)] {
        let total: u64 = flows
            .iter()
            .filter(|r| r.filter == ALL_TIME && r.feature_title == title)
            .map(|r| r.value)
            .sum();
        assert_eq!(total, expected, "all-time count for {title}");
    }
}

#[test]
fn period_buckets_partition_kept_reviews() {
    let (_dir, config) = setup();
    aggregate::run(&config).unwrap();
    let flows = reviewflow_core::data::load_flow_table(&config.flow_table_path()).unwrap();

    // Every matched feature's period buckets must sum to its all-time
    // total, including Mystery Feature whose only review has no
    // parseable date.
    for title in ["Dark Mode", "Cloud Sync", "Mystery Feature"] {
        let all_time: u64 = flows
            .iter()
            .filter(|r| r.filter == ALL_TIME && r.feature_title == title)
            .map(|r| r.value)
            .sum();
        let by_period: u64 = flows
            .iter()
            .filter(|r| {
                r.feature_title == title && r.filter != ALL_TIME && r.filter != WITHIN_TWO_WEEKS
            })
            .map(|r| r.value)
            .sum();
        assert_eq!(all_time, by_period, "partition property for {title}");
    }

    // The undated review lands in its own bucket instead of vanishing
    let undated: u64 = flows
        .iter()
        .filter(|r| r.filter == UNDATED)
        .map(|r| r.value)
        .sum();
    assert_eq!(undated, 1);
}

#[test]
fn within_two_weeks_window_respects_release_date() {
    let (_dir, config) = setup();
    aggregate::run(&config).unwrap();
    let enriched =
        reviewflow_core::data::load_enriched(&config.enriched_table_path()).unwrap();

    // 2024-01-01 is 7 days after the 2023-12-25 release
    let early = enriched
        .iter()
        .find(|r| r.text.contains("love the dark mode"))
        .unwrap();
    assert!(early.within_two_weeks);

    // 2024-01-20 is 26 days after release
    let late = enriched
        .iter()
        .find(|r| r.text.contains("crashes on my phone"))
        .unwrap();
    assert!(!late.within_two_weeks);

    // No release date means no window
    let mystery = enriched
        .iter()
        .find(|r| r.text.contains("mystery"))
        .unwrap();
    assert!(!mystery.within_two_weeks);
}

#[test]
fn unmatched_review_keeps_null_feature_fields() {
    let (_dir, config) = setup();
    aggregate::run(&config).unwrap();
    let enriched =
        reviewflow_core::data::load_enriched(&config.enriched_table_path()).unwrap();

    let orphan = enriched
        .iter()
        .find(|r| r.matched_feature_id == "F9")
        .unwrap();
    assert_eq!(orphan.feature_title, None);
    assert!(!orphan.within_two_weeks);
    // But it still got classified
    assert!(!orphan.cluster.is_empty());
}

#[test]
fn presenter_answers_both_operations_over_artifacts() {
    let (_dir, config) = setup();
    aggregate::run(&config).unwrap();
    let presenter = Presenter::load(&config).unwrap();

    // Operation A over the default bucket
    let diagram = presenter.flow_diagram(&[ALL_TIME.to_string()]);
    assert!(!diagram.links.is_empty());
    let total: u64 = diagram.links.iter().map(|l| l.value).sum();
    assert_eq!(total, 7); // 8 kept minus 1 unmatched

    // Every link resolves inside the node list
    for link in &diagram.links {
        assert!(link.source < diagram.nodes.len());
        assert!(link.target < diagram.nodes.len());
    }

    // Empty selection: valid empty diagram
    let empty = presenter.flow_diagram(&[]);
    assert!(empty.links.is_empty());
    assert!(!empty.nodes.is_empty());

    // Operation B: known feature
    let detail = presenter
        .feature_detail("Dark Mode", &FilterSelection::Scalar(ALL_TIME.to_string()));
    match detail {
        FeatureDetail::Summary(summary) => {
            assert_eq!(summary.app_label, "App: Notes");
            assert_eq!(summary.release_label, "Release Date: Dec 25, 2023");
            assert_eq!(summary.ratio_label, "1/3 reviews (33.3%) within 2 weeks");
            assert!(!summary.trend.is_empty());
        }
        other => panic!("expected summary, got {other:?}"),
    }

    // Operation B: no matching reviews is a no-data answer, not an error
    let missing = presenter.feature_detail(
        "Dark Mode",
        &FilterSelection::Scalar("1999Q1".to_string()),
    );
    assert!(matches!(missing, FeatureDetail::NoData { .. }));
}

#[test]
fn available_filters_list_sentinels_then_quarters() {
    let (_dir, config) = setup();
    aggregate::run(&config).unwrap();
    let presenter = Presenter::load(&config).unwrap();

    let filters = presenter.available_filters();
    assert_eq!(filters[0], ALL_TIME);
    assert_eq!(filters[1], WITHIN_TWO_WEEKS);
    // Period buckets observed in the fixture, ascending, with the
    // undated bucket sorting last
    assert!(filters[2..].contains(&"2024Q1".to_string()));
    assert!(filters[2..].contains(&"2024Q2".to_string()));
    assert_eq!(filters.last().map(String::as_str), Some(UNDATED));
    let periods = &filters[2..];
    let mut sorted = periods.to_vec();
    sorted.sort();
    assert_eq!(periods, sorted.as_slice());
}

#[test]
fn missing_required_column_fails_fast() {
    let dir = TempDir::new().unwrap();
    let features = write(&dir, "Features1.csv", "Feature Id,App\nF1,Notes\n");
    let reviews = write(
        &dir,
        "AppReviews.csv",
        "MatchedFeatureID,Date,ReviewText,App\nF1,2024-01-01,hello world,Notes\n",
    );
    let labeled = write(
        &dir,
        "Labeled_Reviews.csv",
        "Review text,Cluster\ngreat app,Praise\nbad crash,Bugs\n",
    );

    let config = PipelineConfig {
        features,
        reviews,
        labeled,
        data_dir: dir.path().join("out"),
    };
    let err = aggregate::run(&config).unwrap_err();
    assert!(err.to_string().contains("Feature Title"));
}
