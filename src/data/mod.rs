//! Data module - CSV loading and reshaping

mod loader;
mod processor;

pub use loader::{load_raw_table, DataLoader, RawTable, COUNTRY_COLUMN};
pub use processor::{DataProcessor, GdpCell, LongRecord, MergedRecord};
