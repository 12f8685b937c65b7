use serde::{Deserialize, Serialize};

use crate::features::{Feature, FeatureVec};
use crate::table::RawRow;

/// Column holding the binary attack label; a row is attack-labeled when it
/// parses to the integer 1.
pub const ATTACK_COLUMN: &str = "is_attack";
pub const ATTACK_GROUP_COLUMN: &str = "attack_cat";
pub const SERVICE_COLUMN: &str = "service";
pub const PROTOCOL_COLUMN: &str = "proto";
pub const STATE_COLUMN: &str = "state";
pub const DEST_PORT_COLUMN: &str = "dst_port";

/// Categorical and threshold-relevant values extracted from one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowClass {
    pub is_attack: bool,
    pub attack_group: String,
    pub service: String,
    pub protocol: String,
    pub state: String,
    pub packets_total: f64,
    pub bytes_total: f64,
}

fn tag(row: &RawRow<'_, '_>, column: &str, fallback: &str) -> String {
    match row.get(column) {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => fallback.to_owned(),
    }
}

/// Extracts tags and totals from a row. Never fails: absent or empty
/// categorical columns fall back to a literal tag, unparseable numbers
/// read as 0.
pub fn classify(row: &RawRow<'_, '_>) -> RowClass {
    let is_attack = row
        .get(ATTACK_COLUMN)
        .and_then(|v| v.parse::<i64>().ok())
        .is_some_and(|v| v == 1);
    RowClass {
        is_attack,
        attack_group: tag(row, ATTACK_GROUP_COLUMN, "other"),
        service: tag(row, SERVICE_COLUMN, "other"),
        protocol: tag(row, PROTOCOL_COLUMN, "unknown"),
        state: tag(row, STATE_COLUMN, "unknown"),
        packets_total: row.get_f64(Feature::PacketsTotal.column()),
        bytes_total: row.get_f64(Feature::BytesTotal.column()),
    }
}

/// Snapshot of every tracked feature for one row.
pub fn feature_snapshot(row: &RawRow<'_, '_>) -> FeatureVec {
    let mut v = FeatureVec::default();
    for f in Feature::ALL {
        v.set(f, row.get_f64(f.column()));
    }
    v
}

/// Admission thresholds applied before any node or edge side effects.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RowFilter {
    pub min_packets: f64,
    pub min_bytes: f64,
    pub attacks_only: bool,
}

impl RowFilter {
    pub fn admits(&self, class: &RowClass) -> bool {
        if class.packets_total < self.min_packets {
            return false;
        }
        if class.bytes_total < self.min_bytes {
            return false;
        }
        if self.attacks_only && !class.is_attack {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableReader;

    fn classify_line(header: &str, line: &str) -> RowClass {
        let text = format!("{header}\n{line}\n");
        let t = TableReader::new(&text, 10);
        let row = t.rows().next().unwrap();
        classify(&row)
    }

    #[test]
    fn attack_detection_requires_literal_one() {
        let c = classify_line("is_attack,service", "1,http");
        assert!(c.is_attack);
        let c = classify_line("is_attack,service", "0,http");
        assert!(!c.is_attack);
        let c = classify_line("is_attack,service", "yes,http");
        assert!(!c.is_attack);
    }

    #[test]
    fn categorical_fallbacks() {
        let c = classify_line("is_attack,service,proto", "0,,tcp");
        assert_eq!(c.service, "other");
        assert_eq!(c.protocol, "tcp");
        assert_eq!(c.state, "unknown");
        assert_eq!(c.attack_group, "other");
    }

    #[test]
    fn totals_default_to_zero() {
        let c = classify_line("is_attack,packets_total", "0,abc");
        assert_eq!(c.packets_total, 0.0);
        assert_eq!(c.bytes_total, 0.0);
    }

    #[test]
    fn filter_thresholds() {
        let class = classify_line(
            "is_attack,packets_total,bytes_total",
            "0,50,2000",
        );
        let f = RowFilter {
            min_packets: 100.0,
            ..Default::default()
        };
        assert!(!f.admits(&class));
        let f = RowFilter {
            min_packets: 10.0,
            min_bytes: 5000.0,
            ..Default::default()
        };
        assert!(!f.admits(&class));
        let f = RowFilter {
            min_packets: 10.0,
            min_bytes: 1000.0,
            ..Default::default()
        };
        assert!(f.admits(&class));
    }

    #[test]
    fn attacks_only_filter() {
        let benign = classify_line("is_attack,packets_total", "0,10");
        let attack = classify_line("is_attack,packets_total", "1,10");
        let f = RowFilter {
            attacks_only: true,
            ..Default::default()
        };
        assert!(!f.admits(&benign));
        assert!(f.admits(&attack));
    }
}
