//! Data module - CSV loading, cleaning and classification

mod category;
mod loader;
mod processor;
pub mod schema;

pub use category::CategoryFilter;
pub use loader::DataLoader;
pub use processor::{DataProcessor, ProcessorError};
