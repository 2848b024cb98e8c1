//! Transformer trait for data transformation

use crate::Result;

/// Transformer trait for transforming extracted data before it is loaded
///
/// # Example
/// ```no_run
/// use tableport::etl::Transformer;
/// use tableport::{Dataset, Result};
///
/// struct ColumnDropper {
///     name: String,
/// }
///
/// impl Transformer for ColumnDropper {
///     type Input = Dataset;
///     type Output = Dataset;
///
///     fn transform(&self, input: Dataset) -> Result<Dataset> {
///         let keep = input
///             .columns()
///             .iter()
///             .filter(|c| c.name != self.name)
///             .cloned()
///             .collect();
///         Ok(Dataset::new(keep))
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Identity transformer that passes items through unchanged
///
/// Use this when a pipeline needs a transformer but the data is loaded as read.
pub struct IdentityTransformer<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for IdentityTransformer<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> IdentityTransformer<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Send + Sync> Transformer for IdentityTransformer<T> {
    type Input = T;
    type Output = T;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        Ok(input)
    }
}
