//! Read-only query layer over the derived tables.
//!
//! A [`Presenter`] loads the flow table, the enriched reviews, and the
//! feature reference once, builds the label index, and then answers the two
//! interaction queries — flow diagram for a filter selection, and detail
//! summary for a clicked feature — as pure functions of its immutable
//! state.

pub mod labels;

use crate::config::PipelineConfig;
use crate::data;
use crate::error::Result;
use crate::types::{week_start, EnrichedReview, Feature, FlowRecord, TimeFilter, ALL_TIME};
use chrono::NaiveDate;
use labels::LabelIndex;
use std::collections::BTreeMap;
use tracing::info;

/// One source→target flow with its weight. `feature_title` carries the full
/// (untruncated) title for the click-through lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: u64,
    pub feature_title: String,
}

/// Node list plus link list: everything the chart renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDiagram {
    pub nodes: Vec<String>,
    pub links: Vec<FlowLink>,
}

/// Filter argument for the detail query. A list is a membership test over
/// period keys; a scalar is interpreted through the sentinel rules.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSelection {
    List(Vec<String>),
    Scalar(String),
}

/// Review count for one calendar week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyCount {
    pub week_start: NaiveDate,
    pub reviews: u64,
}

/// Computed summary for a clicked feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub title: String,
    pub app_label: String,
    pub release_label: String,
    pub ratio_label: String,
    pub trend: Vec<WeeklyCount>,
}

/// Detail query result; an empty review subset is data, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureDetail {
    NoData { title: String },
    Summary(FeatureSummary),
}

/// Immutable presenter state, loaded once per session.
pub struct Presenter {
    flows: Vec<FlowRecord>,
    reviews: Vec<EnrichedReview>,
    features: Vec<Feature>,
    index: LabelIndex,
}

impl Presenter {
    /// Build from already-loaded tables. The label index is derived from
    /// the distinct feature titles and cluster names observed in the flow
    /// table, in first-appearance order.
    pub fn new(
        flows: Vec<FlowRecord>,
        reviews: Vec<EnrichedReview>,
        features: Vec<Feature>,
    ) -> Self {
        let mut titles: Vec<String> = Vec::new();
        let mut clusters: Vec<String> = Vec::new();
        for record in &flows {
            if !titles.contains(&record.feature_title) {
                titles.push(record.feature_title.clone());
            }
            if !clusters.contains(&record.cluster) {
                clusters.push(record.cluster.clone());
            }
        }
        let index = LabelIndex::build(&titles, &clusters);
        info!(
            "Presenter ready: {} flow rows, {} reviews, {} nodes",
            flows.len(),
            reviews.len(),
            index.len()
        );
        Self {
            flows,
            reviews,
            features,
            index,
        }
    }

    /// Load the derived artifacts plus the feature reference table.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let flows = data::load_flow_table(&config.flow_table_path())?;
        let reviews = data::load_enriched(&config.enriched_table_path())?;
        let features = data::load_features(&config.features)?;
        Ok(Self::new(flows, reviews, features))
    }

    pub fn label_index(&self) -> &LabelIndex {
        &self.index
    }

    /// Distinct filter values present in the flow table: sentinels first,
    /// then period buckets in ascending order (the undated bucket sorts
    /// after the quarter keys).
    pub fn available_filters(&self) -> Vec<String> {
        let mut quarters: Vec<String> = self
            .flows
            .iter()
            .filter(|r| matches!(TimeFilter::parse(&r.filter), TimeFilter::Quarter(_)))
            .map(|r| r.filter.clone())
            .collect();
        quarters.sort_unstable();
        quarters.dedup();

        let mut filters = vec![
            ALL_TIME.to_string(),
            crate::types::WITHIN_TWO_WEEKS.to_string(),
        ];
        filters.extend(quarters);
        filters
    }

    /// Operation A: build the flow diagram for the selected filter buckets.
    ///
    /// An empty selection yields an empty link list over the full node
    /// list; rows whose labels are somehow absent from the index are
    /// skipped rather than failing.
    pub fn flow_diagram(&self, selected: &[String]) -> FlowDiagram {
        let links = self
            .flows
            .iter()
            .filter(|record| selected.iter().any(|s| s == &record.filter))
            .filter_map(|record| {
                let source = self.index.feature_position(&record.feature_title)?;
                let target = self.index.cluster_position(&record.cluster)?;
                Some(FlowLink {
                    source,
                    target,
                    value: record.value,
                    feature_title: record.feature_title.clone(),
                })
            })
            .collect();

        FlowDiagram {
            nodes: self.index.labels().to_vec(),
            links,
        }
    }

    /// Reviews that pass the filter selection.
    fn filtered_reviews(&self, selection: &FilterSelection) -> Vec<&EnrichedReview> {
        match selection {
            // A list is a strict membership test over period keys; sentinel
            // strings inside a list match no review (callers pass sentinels
            // as scalars).
            FilterSelection::List(periods) => self
                .reviews
                .iter()
                .filter(|r| periods.iter().any(|s| s == &r.review_period))
                .collect(),
            FilterSelection::Scalar(value) => match TimeFilter::parse(value) {
                TimeFilter::AllTime => self.reviews.iter().collect(),
                TimeFilter::WithinTwoWeeks => {
                    self.reviews.iter().filter(|r| r.within_two_weeks).collect()
                }
                TimeFilter::Quarter(q) => self
                    .reviews
                    .iter()
                    .filter(|r| r.review_period == q)
                    .collect(),
            },
        }
    }

    /// Operation B: summarize the clicked feature under the current filter
    /// selection.
    pub fn feature_detail(&self, title: &str, selection: &FilterSelection) -> FeatureDetail {
        let subset: Vec<&EnrichedReview> = self
            .filtered_reviews(selection)
            .into_iter()
            .filter(|r| r.feature_title.as_deref() == Some(title))
            .collect();

        if subset.is_empty() {
            return FeatureDetail::NoData {
                title: title.to_string(),
            };
        }

        let app = subset
            .iter()
            .find_map(|r| r.app.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let release = self
            .features
            .iter()
            .find(|f| f.title == title)
            .and_then(|f| f.release_date);
        let release_label = match release {
            Some(d) => format!("Release Date: {}", d.format("%b %d, %Y")),
            None => "Release Date: Unknown".to_string(),
        };

        let total = subset.len();
        let within = subset.iter().filter(|r| r.within_two_weeks).count();
        let percent = (within as f64 / total as f64) * 100.0;
        let ratio_label =
            format!("{within}/{total} reviews ({percent:.1}%) within 2 weeks");

        let mut weekly: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for review in &subset {
            if let Some(date) = review.date {
                *weekly.entry(week_start(date)).or_insert(0) += 1;
            }
        }
        let trend = weekly
            .into_iter()
            .map(|(week_start, reviews)| WeeklyCount {
                week_start,
                reviews,
            })
            .collect();

        FeatureDetail::Summary(FeatureSummary {
            title: title.to_string(),
            app_label: format!("App: {app}"),
            release_label,
            ratio_label,
            trend,
        })
    }
}
