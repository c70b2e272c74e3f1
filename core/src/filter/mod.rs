//! Filter selections and the record predicates built from them.

mod predicate;
mod state;
mod store;

pub use predicate::RecordFilter;
pub use state::FilterState;
pub use store::{FilterChange, FilterListener, FilterStore};
