
use std::fmt;

mod bernoulli;

pub use bernoulli::{BernoulliMixture, BernoulliFormatter};

#[derive( Debug, Clone, PartialEq )]
/// Errors of the model layer
pub enum MixtureError {
	/// parameter arrays are malformed
	Validation( String ),
	/// data set width disagrees with the dimensionality of the model
	DimensionMismatch{ expected: usize, got: usize },
	/// a row has zero likelihood under every component
	DegenerateSupport{ row: usize },
	/// a component received zero effective weight in the update
	DegenerateComponent{ component: usize },
}

impl fmt::Display for MixtureError {
	fn fmt( &self, formatter: &mut fmt::Formatter ) -> fmt::Result {
		match self {
			MixtureError::Validation( reason ) =>
				write!( formatter, "invalid parameters: {}", reason ),
			MixtureError::DimensionMismatch{ expected, got } =>
				write!( formatter, "data set width does not match the number of dimensions: expected {}, got {}", expected, got ),
			MixtureError::DegenerateSupport{ row } =>
				write!( formatter, "row {} has zero likelihood under every component", row ),
			MixtureError::DegenerateComponent{ component } =>
				write!( formatter, "component {} received zero effective weight", component ),
		}
	}
}

impl std::error::Error for MixtureError {}

#[derive( Debug, Clone )]
/// Controls the EM iteration of `BernoulliMixture::fit`
pub struct FitOptions {
	/// maximum number of parameter updates, None runs until convergence
	pub iteration_limit: Option<u64>,
	/// absolute tolerance on the log likelihood delta that marks convergence
	pub convergence_threshold: f64,
	/// record the log likelihood of every update
	pub trace_likelihood: bool,
}

impl Default for FitOptions {
	fn default() -> FitOptions {
		FitOptions{
			iteration_limit: Some( 1000 ),
			convergence_threshold: 1e-6,
			trace_likelihood: false,
		}
	}
}

#[derive( Debug, Clone, PartialEq )]
/// Reports whether the likelihood stabilized and after how many parameter updates
pub struct ConvergenceStatus {
	pub converged: bool,
	pub number_of_iterations: u64,
	/// log likelihood of every update, present only when tracing was requested
	pub likelihood_trace: Option<Vec<f64>>,
}

impl ConvergenceStatus {
	pub fn trace_available( &self ) -> bool {
		self.likelihood_trace.is_some()
	}
}

impl fmt::Display for ConvergenceStatus {
	fn fmt( &self, formatter: &mut fmt::Formatter ) -> fmt::Result {
		let converged_text = if self.converged { "converged" } else { "did not converge" };
		let trace_text = if self.trace_available() { " (trace available)" } else { "" };
		write!( formatter, "<{} in {} iterations{}>", converged_text, self.number_of_iterations, trace_text )
	}
}
