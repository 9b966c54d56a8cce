pub mod course;
pub mod criteria;

pub use course::{CourseId, CourseRecord};
pub use criteria::{FilterCriteria, SearchParams, SortDirection};
