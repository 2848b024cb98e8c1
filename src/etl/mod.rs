//! Core ETL (Extract, Transform, Load) abstractions
//!
//! A run first enumerates work items (tables, files), then pushes each item
//! through extract → transform → load → verify, one at a time, in order.

mod enumerate;
mod extract;
mod load;
mod pipeline;
mod transform;

pub use enumerate::{Enumerator, WorkItem};
pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::{FailurePolicy, ItemOutcome, ItemReport, Pipeline, RunReport};
pub use transform::{IdentityTransformer, Transformer};
