mod dataset;
mod load;
mod parse;

pub use dataset::{Dataset, Point};
pub use load::load_dataset;
