use serde::{Deserialize, Serialize};

/// Closed set of numeric flow features tracked by the pipeline.
///
/// Every feature is summed per node and folded into global statistics
/// during aggregation. Configuration names are resolved against this set
/// up front, so a typo in a feature column is an error instead of a
/// silent zero throughout the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    PacketsTotal,
    BytesTotal,
    AvgPacketSize,
    FlowDuration,
    AvgJitter,
    PacketRatio,
    ByteRatio,
    DiversePorts,
    RepeatedConnection,
    ResponseBodyLen,
}

impl Feature {
    pub const ALL: [Feature; 10] = [
        Feature::PacketsTotal,
        Feature::BytesTotal,
        Feature::AvgPacketSize,
        Feature::FlowDuration,
        Feature::AvgJitter,
        Feature::PacketRatio,
        Feature::ByteRatio,
        Feature::DiversePorts,
        Feature::RepeatedConnection,
        Feature::ResponseBodyLen,
    ];

    /// Column name in the source table.
    pub fn column(self) -> &'static str {
        match self {
            Feature::PacketsTotal => "packets_total",
            Feature::BytesTotal => "bytes_total",
            Feature::AvgPacketSize => "avg_packet_size",
            Feature::FlowDuration => "flow_duration",
            Feature::AvgJitter => "avg_jitter",
            Feature::PacketRatio => "packet_ratio",
            Feature::ByteRatio => "byte_ratio",
            Feature::DiversePorts => "diverse_ports",
            Feature::RepeatedConnection => "repeated_connection",
            Feature::ResponseBodyLen => "response_body_len",
        }
    }

    pub fn from_column(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.column() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One value per tracked feature. Used both for per-node running sums and
/// for per-edge single-row snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVec([f64; Feature::ALL.len()]);

impl FeatureVec {
    pub fn get(&self, f: Feature) -> f64 {
        self.0[f.index()]
    }

    pub fn set(&mut self, f: Feature, v: f64) {
        self.0[f.index()] = v;
    }

    pub fn add(&mut self, other: &FeatureVec) {
        for (acc, v) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += v;
        }
    }
}

/// Running statistics for one feature over the raw per-row values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStat {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: u64,
    pub avg: f64,
}

impl Default for FeatureStat {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
            avg: 0.0,
        }
    }
}

impl FeatureStat {
    pub fn observe(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
        self.sum += v;
        self.count += 1;
    }

    pub fn finalize(&mut self) {
        if self.count > 0 {
            self.avg = self.sum / self.count as f64;
        }
    }

    /// Linear rescale of `v` to [0,1] against the observed range.
    /// A degenerate range (min == max, or nothing observed) yields 0.
    pub fn normalized(&self, v: f64) -> f64 {
        let range = self.max - self.min;
        if range <= 0.0 || !range.is_finite() {
            return 0.0;
        }
        ((v - self.min) / range).clamp(0.0, 1.0)
    }
}

/// Per-run global statistics, one slot per tracked feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    stats: [FeatureStat; Feature::ALL.len()],
}

impl FeatureStats {
    pub fn get(&self, f: Feature) -> &FeatureStat {
        &self.stats[f.index()]
    }

    pub fn observe_row(&mut self, values: &FeatureVec) {
        for f in Feature::ALL {
            self.stats[f.index()].observe(values.get(f));
        }
    }

    pub fn finalize(&mut self) {
        for s in &mut self.stats {
            s.finalize();
        }
    }
}
