pub mod color;
pub mod geometry;
pub mod starfield;

pub use color::{ColorPolicy, ColorResolver, DEFAULT_COLOR};
pub use geometry::{freshness_bucket, orbit_speed, size_for};
pub use starfield::{group_by_section, Star, StarfieldLayout};
