//! Display-label index for the flow diagram.
//!
//! Node positions are a bijection between display labels and integers:
//! truncated feature titles first, cluster names after. Built once at
//! startup and immutable for the presenter's lifetime.

use std::collections::HashMap;

/// Maximum display length for a feature title before truncation
pub const TRUNCATE_LEN: usize = 40;
/// Marker appended to truncated titles
pub const ELLIPSIS: &str = "...";

/// Display label for a feature title: first 40 characters plus an ellipsis
/// marker when the title is longer.
pub fn truncate_label(title: &str) -> String {
    let mut chars = title.chars();
    let prefix: String = chars.by_ref().take(TRUNCATE_LEN).collect();
    if chars.next().is_some() {
        format!("{prefix}{ELLIPSIS}")
    } else {
        prefix
    }
}

/// Bijection between display labels and node positions.
#[derive(Debug, Clone)]
pub struct LabelIndex {
    /// Node labels in position order: truncated feature titles, then clusters
    labels: Vec<String>,
    /// Full feature title -> node position
    feature_positions: HashMap<String, usize>,
    /// Cluster name -> node position
    cluster_positions: HashMap<String, usize>,
    /// Display label -> full feature title
    full_titles: HashMap<String, String>,
}

impl LabelIndex {
    /// Build the index from distinct feature titles and cluster names, in
    /// the order they were observed in the flow table.
    ///
    /// Two titles sharing a 40-character prefix would truncate to the same
    /// display label; a ` #n` suffix keeps every label distinct so the
    /// position mapping stays a bijection.
    pub fn build(feature_titles: &[String], clusters: &[String]) -> Self {
        let mut labels = Vec::with_capacity(feature_titles.len() + clusters.len());
        let mut feature_positions = HashMap::new();
        let mut cluster_positions = HashMap::new();
        let mut full_titles = HashMap::new();

        let mut push_unique = |labels: &mut Vec<String>, candidate: String| -> String {
            let mut label = candidate.clone();
            let mut suffix = 2;
            while labels.contains(&label) {
                label = format!("{candidate} #{suffix}");
                suffix += 1;
            }
            labels.push(label.clone());
            label
        };

        for title in feature_titles {
            let label = push_unique(&mut labels, truncate_label(title));
            feature_positions.insert(title.clone(), labels.len() - 1);
            full_titles.insert(label, title.clone());
        }
        for cluster in clusters {
            push_unique(&mut labels, cluster.clone());
            cluster_positions.insert(cluster.clone(), labels.len() - 1);
        }

        Self {
            labels,
            feature_positions,
            cluster_positions,
            full_titles,
        }
    }

    /// All node labels in position order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Node position for a full feature title.
    pub fn feature_position(&self, full_title: &str) -> Option<usize> {
        self.feature_positions.get(full_title).copied()
    }

    /// Node position for a cluster name.
    pub fn cluster_position(&self, cluster: &str) -> Option<usize> {
        self.cluster_positions.get(cluster).copied()
    }

    /// Reverse the truncation: full title for a feature display label.
    pub fn full_title(&self, display_label: &str) -> Option<&str> {
        self.full_titles.get(display_label).map(String::as_str)
    }
}
