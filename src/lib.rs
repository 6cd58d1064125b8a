//! Reviewflow - App-Review Clustering and Flow Aggregation
//!
//! A two-stage pipeline over app-review text:
//! - **Aggregator**: merges raw review and feature tables, trains a TF-IDF
//!   plus softmax classifier on a small labeled subset, scores every
//!   review, derives release-window and quarter fields, and writes the
//!   Sankey-compatible flow table plus the enriched review table.
//! - **Presenter**: loads the derived tables once, builds an immutable
//!   label index, and answers two queries — flow diagram for a filter
//!   selection, and detail summary for a clicked feature.
//!
//! # Example
//!
//! ```ignore
//! use reviewflow_core::{aggregate, config::PipelineConfig, presenter::Presenter};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::default();
//!     aggregate::run(&config)?;
//!
//!     let presenter = Presenter::load(&config)?;
//!     let diagram = presenter.flow_diagram(&["All Time".to_string()]);
//!     println!("{} links", diagram.links.len());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod presenter;
pub mod types;

// Re-export commonly used types
pub use classify::ClusterModel;
pub use config::PipelineConfig;
pub use error::{ReviewFlowError, Result};
pub use presenter::{FeatureDetail, FilterSelection, FlowDiagram, FlowLink, Presenter};
pub use types::{EnrichedReview, Feature, FlowRecord, LabeledReview, Review, TimeFilter};
