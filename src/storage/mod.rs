pub mod dataset;

pub use dataset::DatasetStore;
pub use dataset::COLUMNS;
