pub mod aggregate;
pub mod charts;
pub mod etl;
pub mod normalize;
pub mod report;
pub mod transform;

pub use crate::domain::model::{CleanTable, RawTable, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
