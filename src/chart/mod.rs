pub mod config;
pub mod labels;
pub mod scale;
pub mod session;
pub mod style;

pub use config::{ChartConfig, Variant};
pub use session::{ChartSession, KeySelection, PointHover, Tooltip};
