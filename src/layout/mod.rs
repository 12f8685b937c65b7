mod force;

pub use force::{node_radius, ForceLayout, ForceParams};
