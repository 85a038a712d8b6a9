pub mod engine;
pub mod extractor;

pub use crate::domain::model::{CourseListing, CourseRecord, RunSummary};
pub use crate::domain::ports::{Destination, Emitter, Fetcher, HtmlParser};
pub use crate::utils::error::Result;
