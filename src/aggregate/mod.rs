//! Batch aggregation: merge, derive, classify, count.
//!
//! One-shot offline pass. Loads the three raw tables, left-joins reviews to
//! features, drops signal-free reviews, derives the release-window and
//! quarter fields, scores every review with the fitted [`ClusterModel`],
//! and writes the two derived artifacts.

use crate::classify::ClusterModel;
use crate::config::PipelineConfig;
use crate::data;
use crate::error::Result;
use crate::types::{
    quarter_key, within_two_weeks, EnrichedReview, Feature, FlowRecord, Review, ALL_TIME,
    UNDATED, WITHIN_TWO_WEEKS,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

/// Counters reported after an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    pub reviews_total: usize,
    pub reviews_kept: usize,
    pub clusters: usize,
    pub flow_rows: usize,
}

/// Left-join reviews to features and derive the window/period fields.
///
/// Reviews whose text is missing or whitespace-only are dropped here; they
/// carry no signal and must not reach the classifier. Unmatched reviews
/// keep `None` feature fields. Reviews without a parseable date land in
/// the [`UNDATED`] period bucket, so the per-period views still partition
/// the all-time view. The predicted cluster is filled in by
/// [`classify_reviews`].
pub fn merge_and_derive(reviews: &[Review], features: &[Feature]) -> Vec<EnrichedReview> {
    let by_id: HashMap<&str, &Feature> = features
        .iter()
        .map(|f| (f.feature_id.as_str(), f))
        .collect();

    reviews
        .iter()
        .filter(|review| !review.text.trim().is_empty())
        .map(|review| {
            let feature = by_id.get(review.matched_feature_id.as_str());
            let release_date = feature.and_then(|f| f.release_date);
            EnrichedReview {
                matched_feature_id: review.matched_feature_id.clone(),
                date: review.date,
                text: review.text.clone(),
                app: review
                    .app
                    .clone()
                    .or_else(|| feature.and_then(|f| f.app.clone())),
                feature_title: feature.map(|f| f.title.clone()),
                release_date,
                within_two_weeks: within_two_weeks(review.date, release_date),
                review_period: review
                    .date
                    .map(quarter_key)
                    .unwrap_or_else(|| UNDATED.to_string()),
                cluster: String::new(),
            }
        })
        .collect()
}

/// Assign a predicted cluster to every enriched review.
pub fn classify_reviews(reviews: &mut [EnrichedReview], model: &ClusterModel) {
    let texts: Vec<&str> = reviews.iter().map(|r| r.text.as_str()).collect();
    let clusters = model.predict_batch(&texts);
    for (review, cluster) in reviews.iter_mut().zip(clusters) {
        review.cluster = cluster;
    }
}

/// Count reviews grouped by (feature, cluster), tagged with a filter bucket.
///
/// Reviews without a matched feature title are excluded, mirroring grouped
/// aggregation over a null key.
fn grouped_counts<'a, F>(
    reviews: &'a [EnrichedReview],
    keep: F,
    filter: &str,
) -> Vec<FlowRecord>
where
    F: Fn(&'a EnrichedReview) -> bool,
{
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for review in reviews {
        if !keep(review) {
            continue;
        }
        if let Some(title) = review.feature_title.as_deref() {
            *counts.entry((title, review.cluster.as_str())).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|((title, cluster), value)| FlowRecord {
            feature_title: title.to_string(),
            cluster: cluster.to_string(),
            filter: filter.to_string(),
            value,
        })
        .collect()
}

/// Build the concatenated flow table: the all-time view, one view per
/// period observed in the data (quarters, then the undated bucket), and
/// the within-2-weeks view.
pub fn build_flow_table(reviews: &[EnrichedReview]) -> Vec<FlowRecord> {
    let mut records = grouped_counts(reviews, |_| true, ALL_TIME);

    let mut periods: Vec<&str> = reviews.iter().map(|r| r.review_period.as_str()).collect();
    periods.sort_unstable();
    periods.dedup();

    for period in periods {
        records.extend(grouped_counts(
            reviews,
            |r| r.review_period == period,
            period,
        ));
    }

    records.extend(grouped_counts(
        reviews,
        |r| r.within_two_weeks,
        WITHIN_TWO_WEEKS,
    ));
    records
}

/// Run the full aggregation pass and persist both derived artifacts.
pub fn run(config: &PipelineConfig) -> Result<AggregateSummary> {
    let features = data::load_features(&config.features)?;
    let reviews = data::load_reviews(&config.reviews)?;
    let labeled = data::load_labeled(&config.labeled)?;

    let model = ClusterModel::fit(&labeled)?;

    let reviews_total = reviews.len();
    let mut enriched = merge_and_derive(&reviews, &features);
    let dropped = reviews_total - enriched.len();
    if dropped > 0 {
        warn!("Dropped {} reviews with empty text", dropped);
    }

    classify_reviews(&mut enriched, &model);
    let flow_table = build_flow_table(&enriched);

    let out_dir = config.resolved_data_dir();
    std::fs::create_dir_all(&out_dir)?;
    data::write_flow_table(&config.flow_table_path(), &flow_table)?;
    data::write_enriched(&config.enriched_table_path(), &enriched)?;

    info!(
        "Aggregation complete: {}/{} reviews kept, {} flow rows",
        enriched.len(),
        reviews_total,
        flow_table.len()
    );

    Ok(AggregateSummary {
        reviews_total,
        reviews_kept: enriched.len(),
        clusters: model.labels().len(),
        flow_rows: flow_table.len(),
    })
}
