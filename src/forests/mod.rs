/// The random forest model
pub mod forest;
/// Forest configuration
pub mod params;

pub use forest::RandomForest;
pub use params::ForestParams;
