//! CSV table loading and persistence.
//!
//! All three raw inputs and both derived artifacts move through this
//! module. Header validation is explicit so a missing required column is a
//! fatal, named error at load time; cell-level date problems are lenient
//! and coerce to `None`.

use crate::error::{ReviewFlowError, Result};
use crate::types::{
    parse_date_flex, EnrichedReview, Feature, FlowRecord, LabeledReview, Review, UNDATED,
};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;
use tracing::{debug, info};

/// Date format used in derived artifacts
const ARTIFACT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve required column positions, failing fast on any missing header.
fn column_indexes<const N: usize>(
    headers: &StringRecord,
    names: [&str; N],
    file: &Path,
) -> Result<[usize; N]> {
    let mut indexes = [0usize; N];
    for (slot, name) in indexes.iter_mut().zip(names) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ReviewFlowError::MissingColumn {
                column: name.to_string(),
                file: file.display().to_string(),
            })?;
    }
    Ok(indexes)
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

fn optional_cell(record: &StringRecord, idx: usize) -> Option<String> {
    let value = cell(record, idx);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(ARTIFACT_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Load the app-feature reference table.
pub fn load_features(path: &Path) -> Result<Vec<Feature>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let [id, title, release, app] = column_indexes(
        reader.headers()?,
        ["Feature Id", "Feature Title", "Release Date", "App"],
        path,
    )?;

    let mut features = Vec::new();
    for record in reader.records() {
        let record = record?;
        features.push(Feature {
            feature_id: cell(&record, id).to_string(),
            title: cell(&record, title).to_string(),
            release_date: parse_date_flex(cell(&record, release)),
            app: optional_cell(&record, app),
        });
    }
    info!("Loaded {} features from {}", features.len(), path.display());
    Ok(features)
}

/// Load the raw review table.
pub fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let [feature_id, date, text, app] = column_indexes(
        reader.headers()?,
        ["MatchedFeatureID", "Date", "ReviewText", "App"],
        path,
    )?;

    let mut reviews = Vec::new();
    for record in reader.records() {
        let record = record?;
        reviews.push(Review {
            matched_feature_id: cell(&record, feature_id).to_string(),
            date: parse_date_flex(cell(&record, date)),
            text: record.get(text).unwrap_or("").to_string(),
            app: optional_cell(&record, app),
        });
    }
    info!("Loaded {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Load the human-labeled training subset.
pub fn load_labeled(path: &Path) -> Result<Vec<LabeledReview>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let [text, cluster] = column_indexes(reader.headers()?, ["Review text", "Cluster"], path)?;

    let mut labeled = Vec::new();
    for record in reader.records() {
        let record = record?;
        labeled.push(LabeledReview {
            text: record.get(text).unwrap_or("").to_string(),
            cluster: cell(&record, cluster).to_string(),
        });
    }
    info!(
        "Loaded {} labeled examples from {}",
        labeled.len(),
        path.display()
    );
    Ok(labeled)
}

/// Persist the flow-record table.
pub fn write_flow_table(path: &Path, records: &[FlowRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(["Feature Title", "Cluster", "Filter", "Value"])?;
    for record in records {
        writer.write_record([
            record.feature_title.as_str(),
            record.cluster.as_str(),
            record.filter.as_str(),
            &record.value.to_string(),
        ])?;
    }
    writer.flush()?;
    debug!("Wrote {} flow records to {}", records.len(), path.display());
    Ok(())
}

/// Load the flow-record table written by the aggregator.
pub fn load_flow_table(path: &Path) -> Result<Vec<FlowRecord>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let [title, cluster, filter, value] = column_indexes(
        reader.headers()?,
        ["Feature Title", "Cluster", "Filter", "Value"],
        path,
    )?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let count: u64 =
            cell(&record, value)
                .parse()
                .map_err(|_| ReviewFlowError::MissingColumn {
                    column: "Value".to_string(),
                    file: path.display().to_string(),
                })?;
        records.push(FlowRecord {
            feature_title: cell(&record, title).to_string(),
            cluster: cell(&record, cluster).to_string(),
            filter: cell(&record, filter).to_string(),
            value: count,
        });
    }
    Ok(records)
}

/// Persist the enriched review table.
pub fn write_enriched(path: &Path, reviews: &[EnrichedReview]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record([
        "MatchedFeatureID",
        "Date",
        "ReviewText",
        "App_x",
        "Feature Title",
        "Release Date",
        "Within2Weeks",
        "Review Period",
        "Cluster",
    ])?;
    for review in reviews {
        writer.write_record([
            review.matched_feature_id.as_str(),
            &format_date(review.date),
            review.text.as_str(),
            review.app.as_deref().unwrap_or(""),
            review.feature_title.as_deref().unwrap_or(""),
            &format_date(review.release_date),
            if review.within_two_weeks { "true" } else { "false" },
            review.review_period.as_str(),
            review.cluster.as_str(),
        ])?;
    }
    writer.flush()?;
    debug!(
        "Wrote {} enriched reviews to {}",
        reviews.len(),
        path.display()
    );
    Ok(())
}

/// Load the enriched review table written by the aggregator.
pub fn load_enriched(path: &Path) -> Result<Vec<EnrichedReview>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let [feature_id, date, text, app, title, release, within, period, cluster] = column_indexes(
        reader.headers()?,
        [
            "MatchedFeatureID",
            "Date",
            "ReviewText",
            "App_x",
            "Feature Title",
            "Release Date",
            "Within2Weeks",
            "Review Period",
            "Cluster",
        ],
        path,
    )?;

    let mut reviews = Vec::new();
    for record in reader.records() {
        let record = record?;
        reviews.push(EnrichedReview {
            matched_feature_id: cell(&record, feature_id).to_string(),
            date: parse_date_flex(cell(&record, date)),
            text: record.get(text).unwrap_or("").to_string(),
            app: optional_cell(&record, app),
            feature_title: optional_cell(&record, title),
            release_date: parse_date_flex(cell(&record, release)),
            within_two_weeks: cell(&record, within).eq_ignore_ascii_case("true"),
            review_period: match cell(&record, period) {
                "" => UNDATED.to_string(),
                p => p.to_string(),
            },
            cluster: cell(&record, cluster).to_string(),
        });
    }
    Ok(reviews)
}
