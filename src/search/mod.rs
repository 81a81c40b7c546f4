//! Search Criteria Model: what a search screen submits.

mod criteria;
pub mod literal;

pub use criteria::{FieldValue, SearchCriteria, SearchRequest, SortEntry, TagsOperation};
