use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::Feature;
use crate::table::TableReader;

/// Quality metrics for one feature, from the offline analysis side table.
/// Display-only: the core pipeline never consults these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureQuality {
    pub importance: f64,
    pub mutual_info: f64,
    pub correlation: f64,
    pub cohens_d: f64,
    pub interpretability: f64,
    pub combined_score: f64,
    pub group: String,
}

/// Parses the side table (`feature,importance,mutual_info,correlation,
/// cohens_d,interpretability,combined_score,group`). Rows naming columns
/// outside the tracked feature set are skipped.
pub fn parse(text: &str) -> HashMap<Feature, FeatureQuality> {
    let table = TableReader::new(text, usize::MAX);
    let mut out = HashMap::new();
    for row in table.rows() {
        let Some(feature) = row.get("feature").and_then(Feature::from_column) else {
            continue;
        };
        out.insert(
            feature,
            FeatureQuality {
                importance: row.get_f64("importance"),
                mutual_info: row.get_f64("mutual_info"),
                correlation: row.get_f64("correlation"),
                cohens_d: row.get_f64("cohens_d"),
                interpretability: row.get_f64("interpretability"),
                combined_score: row.get_f64("combined_score"),
                group: row.get("group").unwrap_or("other").to_owned(),
            },
        );
    }
    out
}
