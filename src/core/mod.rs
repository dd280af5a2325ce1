pub mod aggregate;
pub mod collector;
pub mod etl;
pub mod persist;

pub use crate::domain::model::{Collection, Page, StartupRecord};
pub use crate::domain::ports::{ConfigProvider, PageSource, Pipeline, Storage};
pub use crate::utils::error::Result;
