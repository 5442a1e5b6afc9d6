
pub mod data;
pub mod io;
pub mod model;

pub use data::{Row, Count, Dataset, AggregatedDataset};
pub use model::{BernoulliMixture, BernoulliFormatter, ConvergenceStatus, FitOptions, MixtureError};

/// Objects that can be recorded in the log
pub trait Loggable {
	fn log( &self, message: &str, level: tracing::Level );
}
