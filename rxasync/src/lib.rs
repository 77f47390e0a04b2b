mod async_state;
mod cancellation;
mod input;
mod operation;
mod scope;
mod snapshot;
pub mod fetch;
pub mod macros;

pub use async_state::*;
pub use cancellation::*;
pub use input::*;
pub use operation::*;
pub use scope::*;
pub use snapshot::*;

#[cfg(test)]
mod unit_tests;

/// Values that can live inside a reactive cell and cross task boundaries.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Value for T {}
