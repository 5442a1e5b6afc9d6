
mod serialize; // serialization and pretty printing of the model

use rand::prelude::*;
use rayon::prelude::*;
use statrs::distribution::Categorical;
use tracing::{debug, info};

use crate::Loggable;
use crate::data::{Count, Dataset, Row};

use super::{ConvergenceStatus, FitOptions, MixtureError};

pub use serialize::BernoulliFormatter;

/// absolute slack allowed on the sum of the mixing coefficients
const MIXING_SUM_TOLERANCE: f64 = 1e-6;

#[derive( Debug, Clone )]
/// Finite mixture of independent Bernoulli distributions over fixed-width binary rows.
/// Every component owns a mixing coefficient and a per-dimension emission probability.
pub struct BernoulliMixture {
	/// prior probability of every component, sums to one
	mixing_coefficients: Vec<f64>,
	/// per component, per dimension probability of emitting a set bit
	emission_probabilities: Vec<Vec<f64>>,
}

impl BernoulliMixture {

	/// Constructs a validated model from K mixing coefficients and a K x D emission matrix
	pub fn new( mixing_coefficients: Vec<f64>, emission_probabilities: Vec<Vec<f64>> ) -> Result<BernoulliMixture, MixtureError> {
		validate( &mixing_coefficients, &emission_probabilities )?;
		Ok( BernoulliMixture{ mixing_coefficients, emission_probabilities } )
	}

	/// Creates a randomly initialized model with uniform mixing coefficients
	/// and emission probabilities drawn away from the borders of the unit interval.
	pub fn random( number_of_components: usize, number_of_dimensions: usize, seed: Option<u64> ) -> BernoulliMixture {
		assert!( number_of_components > 0 && number_of_dimensions > 0, "model needs at least one component and dimension" );
		let mut rng = create_rng( seed );
		let mixing_coefficients = vec!( 1.0 / number_of_components as f64; number_of_components );
		let emission_probabilities = (0 .. number_of_components)
			.map( |_| (0 .. number_of_dimensions).map( |_| rng.gen_range( 0.05 .. 0.95 )).collect() )
			.collect();
		BernoulliMixture{ mixing_coefficients, emission_probabilities }
	}

	pub fn number_of_components( &self ) -> usize {
		self.mixing_coefficients.len()
	}

	pub fn number_of_dimensions( &self ) -> usize {
		self.emission_probabilities.first().map_or( 0, |probabilities| probabilities.len() )
	}

	pub fn mixing_coefficients( &self ) -> &[f64] {
		&self.mixing_coefficients
	}

	pub fn emission_probabilities( &self ) -> &[Vec<f64>] {
		&self.emission_probabilities
	}

	/// K - 1 free mixing coefficients plus K x D emission probabilities
	pub fn number_of_free_parameters( &self ) -> usize {
		(self.number_of_components() - 1)
			+ self.number_of_components() * self.number_of_dimensions()
	}

	/// Log likelihood of the data set under the current parameters
	pub fn log_likelihood( &self, dataset: &Dataset ) -> Result<f64, MixtureError> {
		self.check_width( dataset.width() )?;
		let aggregated = dataset.aggregate();
		let support = calc_support( &self.mixing_coefficients, &self.emission_probabilities, aggregated.rows() );
		Ok( calc_loglik_from_support( &support, aggregated.weights() ))
	}

	/// Akaike information criterion of the model on the data set
	pub fn aic( &self, dataset: &Dataset ) -> Result<f64, MixtureError> {
		let loglik = self.log_likelihood( dataset )?;
		Ok( self.penalised_likelihood( loglik, 2.0 ))
	}

	/// Bayesian information criterion, penalised by the log of the observation count
	pub fn bic( &self, dataset: &Dataset ) -> Result<f64, MixtureError> {
		let loglik = self.log_likelihood( dataset )?;
		Ok( self.penalised_likelihood( loglik, (dataset.len() as f64).ln() ))
	}

	/// Fits the model to the data set with EM and commits the refined parameters.
	/// Convergence is an absolute tolerance check on the log likelihood delta,
	/// detected on the likelihood of the current parameters before any further update.
	/// Returns the final log likelihood together with the convergence report.
	pub fn fit( &mut self, dataset: &Dataset, options: &FitOptions ) -> Result<(f64, ConvergenceStatus), MixtureError> {
		self.check_width( dataset.width() )?;
		if dataset.is_empty() {
			return Err( MixtureError::Validation( "cannot fit to an empty data set".to_string() ));
		}
		// deduplicate once, outside the loop
		let aggregated = dataset.aggregate();

		// the loop refines a working snapshot and commits it only on success
		let mut mixing = self.mixing_coefficients.clone();
		let mut emissions = self.emission_probabilities.clone();

		let mut iterations_done: u64 = 0;
		let mut previous_loglik: Option<f64> = None;
		let mut current_loglik: Option<f64> = None;
		let mut trace = if options.trace_likelihood {
			Some( Vec::with_capacity( options.iteration_limit.unwrap_or( 0 ) as usize ))
		} else {
			None
		};

		let mut converged = false;
		while options.iteration_limit.map_or( true, |limit| iterations_done < limit ) {
			let support = calc_support( &mixing, &emissions, aggregated.rows() );
			let loglik = calc_loglik_from_support( &support, aggregated.weights() );
			current_loglik = Some( loglik );

			if let Some( previous ) = previous_loglik {
				if (loglik - previous).abs() <= options.convergence_threshold {
					converged = true;
					break;
				}
			}

			let responsibilities = calc_posterior_from_support( support )?;
			let (new_mixing, new_emissions) = maximize_parameters(
				&responsibilities, aggregated.rows(), aggregated.weights(), self.number_of_dimensions() )?;
			mixing = new_mixing;
			emissions = new_emissions;

			if let Some( trace ) = trace.as_mut() {
				trace.push( loglik );
			}
			previous_loglik = Some( loglik );
			iterations_done += 1;
			debug!( "iteration {iterations_done}: log likelihood {loglik:.6}" );
		}

		let final_loglik = match current_loglik {
			Some( loglik ) => loglik,
			// a zero iteration budget never touched the data
			None => {
				let support = calc_support( &mixing, &emissions, aggregated.rows() );
				calc_loglik_from_support( &support, aggregated.weights() )
			},
		};

		self.mixing_coefficients = mixing;
		self.emission_probabilities = emissions;
		self.log( "fitted parameters", tracing::Level::DEBUG );
		info!( "fit {} after {} iterations with log likelihood {:.6}",
			if converged { "converged" } else { "stopped" }, iterations_done, final_loglik );

		let status = ConvergenceStatus{
			converged,
			number_of_iterations: iterations_done,
			likelihood_trace: trace,
		};
		Ok( (final_loglik, status) )
	}

	/// Draws observations from the generative process together with their true components.
	/// Sampling is reproducible when a seed is supplied and nondeterministic otherwise.
	pub fn sample( &self, size: usize, seed: Option<u64> ) -> (Dataset, Vec<usize>) {
		let mut rng = create_rng( seed );
		let component_distribution = Categorical::new( &self.mixing_coefficients )
			.expect( "mixing coefficients are validated" );

		let width = self.number_of_dimensions();
		let mut rows = Vec::with_capacity( size );
		let mut labels = Vec::with_capacity( size );
		for _ in 0 .. size {
			let component = component_distribution.sample( &mut rng ) as usize;
			let mut row = Row::with_capacity( width );
			for dimension in 0 .. width {
				if rng.gen_bool( self.emission_probabilities[ component ][ dimension ] ) {
					row.insert( dimension );
				}
			}
			rows.push( row );
			labels.push( component );
		}
		(Dataset::new( rows, width ), labels)
	}

	/// Posterior component membership probabilities for every row of the data set
	pub fn soft_assignment( &self, dataset: &Dataset ) -> Result<Vec<Vec<f64>>, MixtureError> {
		self.check_width( dataset.width() )?;
		let support = calc_support( &self.mixing_coefficients, &self.emission_probabilities, dataset.rows() );
		calc_posterior_from_support( support )
	}

	/// Most likely component for every row of the data set
	pub fn hard_assignment( &self, dataset: &Dataset ) -> Result<Vec<usize>, MixtureError> {
		let assignment = self.soft_assignment( dataset )?;
		Ok( assignment.iter().map( |probabilities| argmax( probabilities )).collect() )
	}

	fn check_width( &self, width: usize ) -> Result<(), MixtureError> {
		if width != self.number_of_dimensions() {
			return Err( MixtureError::DimensionMismatch{ expected: self.number_of_dimensions(), got: width } );
		}
		Ok( () )
	}

	fn penalised_likelihood( &self, log_likelihood: f64, psi: f64 ) -> f64 {
		-2.0 * log_likelihood + psi * self.number_of_free_parameters() as f64
	}
}

fn validate( mixing: &[f64], emissions: &[Vec<f64>] ) -> Result<(), MixtureError> {
	let number_of_components = mixing.len();
	if number_of_components == 0 {
		return Err( MixtureError::Validation( "expected at least one component".to_string() ));
	}
	if emissions.len() != number_of_components {
		return Err( MixtureError::Validation(
			format!( "expected {} emission rows, got {}", number_of_components, emissions.len() )));
	}
	let number_of_dimensions = emissions[ 0 ].len();
	if number_of_dimensions == 0 {
		return Err( MixtureError::Validation( "expected at least one dimension".to_string() ));
	}
	for (component, probabilities) in emissions.iter().enumerate() {
		if probabilities.len() != number_of_dimensions {
			return Err( MixtureError::Validation(
				format!( "emission row {} has {} entries, expected {}", component, probabilities.len(), number_of_dimensions )));
		}
		for probability in probabilities {
			if !is_probability( *probability ) {
				return Err( MixtureError::Validation(
					format!( "emission probability {} of component {} is not in [0, 1]", probability, component )));
			}
		}
	}
	for coefficient in mixing {
		if !is_probability( *coefficient ) {
			return Err( MixtureError::Validation(
				format!( "mixing coefficient {} is not in [0, 1]", coefficient )));
		}
	}
	let total: f64 = mixing.iter().sum();
	if (total - 1.0).abs() > MIXING_SUM_TOLERANCE {
		return Err( MixtureError::Validation(
			format!( "mixing coefficients sum to {}, expected 1", total )));
	}
	Ok( () )
}

fn is_probability( value: f64 ) -> bool {
	value.is_finite() && (0.0 ..= 1.0).contains( &value )
}

/// Weighted likelihood of every row under every component.
/// Entry (i, k) is the mixing coefficient of k times the product of per-dimension
/// Bernoulli factors of row i. Rows are independent, so they are computed in parallel.
fn calc_support( mixing: &[f64], emissions: &[Vec<f64>], rows: &[Row] ) -> Vec<Vec<f64>> {
	rows.par_iter()
		.map( |row| calc_support_row( mixing, emissions, row ))
		.collect()
}

fn calc_support_row( mixing: &[f64], emissions: &[Vec<f64>], row: &Row ) -> Vec<f64> {
	mixing.iter().zip( emissions.iter() )
		.map( |(coefficient, probabilities)| {
			// probabilities of exactly 0 or 1 contribute exact factors, never NaN
			let mut likelihood = *coefficient;
			for (dimension, probability) in probabilities.iter().enumerate() {
				likelihood *= if row.contains( dimension ) { *probability } else { 1.0 - *probability };
			}
			likelihood
		})
		.collect()
}

/// Reduces a support matrix with row weights to the data log likelihood
fn calc_loglik_from_support( support: &[Vec<f64>], weights: &[Count] ) -> f64 {
	support.iter().zip( weights.iter() )
		.map( |(row, weight)| *weight as f64 * row.iter().sum::<f64>().ln() )
		.sum()
}

/// E-step: normalizes every support row into posterior component probabilities
fn calc_posterior_from_support( mut support: Vec<Vec<f64>> ) -> Result<Vec<Vec<f64>>, MixtureError> {
	for (position, row) in support.iter_mut().enumerate() {
		let total: f64 = row.iter().sum();
		if total <= 0.0 {
			return Err( MixtureError::DegenerateSupport{ row: position } );
		}
		for entry in row.iter_mut() {
			*entry /= total;
		}
	}
	Ok( support )
}

/// M-step: closed-form maximum likelihood update of mixing coefficients and emissions
fn maximize_parameters( responsibilities: &[Vec<f64>], rows: &[Row], weights: &[Count], width: usize )
	-> Result<(Vec<f64>, Vec<Vec<f64>>), MixtureError>
{
	let number_of_components = responsibilities.first().map_or( 0, |row| row.len() );
	let mut effective_weights = vec!( 0.0; number_of_components );
	let mut emission_sums = vec!( vec!( 0.0; width ); number_of_components );
	for ((responsibility, row), weight) in responsibilities.iter().zip( rows.iter() ).zip( weights.iter() ) {
		let weight = *weight as f64;
		for (component, share) in responsibility.iter().enumerate() {
			let weighted_share = weight * share;
			effective_weights[ component ] += weighted_share;
			for dimension in row.iter() {
				emission_sums[ component ][ dimension ] += weighted_share;
			}
		}
	}

	let total_weight: f64 = effective_weights.iter().sum();
	let mut mixing = Vec::with_capacity( number_of_components );
	for (component, effective_weight) in effective_weights.iter().enumerate() {
		if !( *effective_weight > 0.0 ) {
			return Err( MixtureError::DegenerateComponent{ component } );
		}
		mixing.push( *effective_weight / total_weight );
		for entry in emission_sums[ component ].iter_mut() {
			*entry /= *effective_weight;
		}
	}
	Ok( (mixing, emission_sums) )
}

fn argmax( values: &[f64] ) -> usize {
	let mut best = 0;
	for (position, value) in values.iter().enumerate() {
		if *value > values[ best ] {
			best = position;
		}
	}
	best
}

fn create_rng( seed: Option<u64> ) -> StdRng {
	match seed {
		Some( seed ) => StdRng::seed_from_u64( seed ),
		None => StdRng::from_entropy(),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	macro_rules! assert_approx {
		($real:expr, $expected:expr, $delta:expr) => {
			if $real < $expected - $delta || $real > $expected + $delta {
				panic!( "Violate {:.6} == {:.6} (+-{:.6})", $real, $expected, $delta );
			}
		}
	}

	fn two_component_model() -> BernoulliMixture {
		BernoulliMixture::new(
			vec!( 0.6, 0.4 ),
			vec!( vec!( 0.9, 0.1, 0.5 ), vec!( 0.1, 0.9, 0.5 )),
		).expect( "parameters are valid" )
	}

	fn generating_model() -> BernoulliMixture {
		BernoulliMixture::new(
			vec!( 0.5, 0.5 ),
			vec!( vec!( 0.9, 0.1, 0.5 ), vec!( 0.1, 0.9, 0.5 )),
		).expect( "parameters are valid" )
	}

	#[test]
	/// Mixing coefficients that sum to 1.1 are rejected
	fn test_rejects_mixing_sum_off_one() {
		let result = BernoulliMixture::new(
			vec!( 0.5, 0.4, 0.2 ),
			vec!( vec!( 0.5, 0.5 ); 3 ),
		);
		assert!( matches!( result, Err( MixtureError::Validation( _ ))));
	}

	#[test]
	/// An emission probability of 1.3 is rejected
	fn test_rejects_out_of_bounds_emission() {
		let result = BernoulliMixture::new(
			vec!( 0.5, 0.5 ),
			vec!( vec!( 0.5, 1.3 ), vec!( 0.5, 0.5 )),
		);
		assert!( matches!( result, Err( MixtureError::Validation( _ ))));
	}

	#[test]
	fn test_rejects_malformed_shapes() {
		// emission row count disagrees with the number of components
		let result = BernoulliMixture::new( vec!( 0.5, 0.5 ), vec!( vec!( 0.5, 0.5 )));
		assert!( matches!( result, Err( MixtureError::Validation( _ ))));

		// ragged emission rows
		let result = BernoulliMixture::new( vec!( 0.5, 0.5 ), vec!( vec!( 0.5, 0.5 ), vec!( 0.5 )));
		assert!( matches!( result, Err( MixtureError::Validation( _ ))));

		// negative mixing coefficient
		let result = BernoulliMixture::new( vec!( 1.1, -0.1 ), vec!( vec!( 0.5 ), vec!( 0.5 )));
		assert!( matches!( result, Err( MixtureError::Validation( _ ))));
	}

	#[test]
	fn test_free_parameter_count() {
		let model = BernoulliMixture::new(
			vec!( 0.2, 0.3, 0.5 ),
			vec!( vec!( 0.5, 0.5, 0.5, 0.5 ); 3 ),
		).expect( "parameters are valid" );
		assert_eq!( model.number_of_free_parameters(), 14 );
	}

	#[test]
	/// Log likelihood of a single row matches the hand-computed support sum
	fn test_support_matches_hand_computation() {
		let model = two_component_model();
		let dataset = Dataset::from_bools( &[ vec!( true, false, true ) ], 3 );

		let expected = (0.6 * 0.9 * 0.9 * 0.5 + 0.4 * 0.1 * 0.1 * 0.5_f64).ln();
		let calculated = model.log_likelihood( &dataset ).expect( "widths match" );
		assert_approx!( calculated, expected, 1e-12 );

		let assignment = model.soft_assignment( &dataset ).expect( "widths match" );
		let total = 0.6 * 0.9 * 0.9 * 0.5 + 0.4 * 0.1 * 0.1 * 0.5;
		assert_approx!( assignment[ 0 ][ 0 ], 0.6 * 0.9 * 0.9 * 0.5 / total, 1e-12 );
		assert_approx!( assignment[ 0 ][ 1 ], 0.4 * 0.1 * 0.1 * 0.5 / total, 1e-12 );
	}

	#[test]
	/// Emission probabilities of exactly 0 and 1 yield exact factors instead of NaN
	fn test_degenerate_probabilities_stay_finite() {
		let model = BernoulliMixture::new( vec!( 1.0 ), vec!( vec!( 1.0, 0.0 )))
			.expect( "parameters are valid" );

		let possible = Dataset::from_bools( &[ vec!( true, false ) ], 2 );
		let loglik = model.log_likelihood( &possible ).expect( "widths match" );
		assert_approx!( loglik, 0.0, 1e-12 );

		let impossible = Dataset::from_bools( &[ vec!( false, true ) ], 2 );
		let loglik = model.log_likelihood( &impossible ).expect( "widths match" );
		assert!( loglik.is_infinite() && loglik.is_sign_negative() );

		// the E-step reports the degenerate row instead of dividing by zero
		let result = model.soft_assignment( &impossible );
		assert_eq!( result, Err( MixtureError::DegenerateSupport{ row: 0 } ));
	}

	#[test]
	/// Deduplicated evaluation equals the naive per-row sum
	fn test_loglik_matches_naive_sum() {
		let model = two_component_model();
		let observations = vec!(
			vec!( true, false, true ),
			vec!( true, false, true ),
			vec!( false, true, false ),
			vec!( true, true, true ),
			vec!( false, false, false ),
			vec!( true, false, true ),
			vec!( false, true, false ),
		);
		let dataset = Dataset::from_bools( &observations, 3 );

		let aggregated_loglik = model.log_likelihood( &dataset ).expect( "widths match" );
		let naive: f64 = dataset.rows().iter()
			.map( |row| {
				let single = Dataset::new( vec!( row.clone() ), 3 );
				model.log_likelihood( &single ).expect( "widths match" )
			})
			.sum();
		assert_approx!( aggregated_loglik, naive, 1e-9 );
	}

	#[test]
	/// Soft assignment rows sum to one and hard assignment picks their arg-max
	fn test_assignment_consistency() {
		let model = two_component_model();
		let observations = vec!(
			vec!( true, false, true ),
			vec!( false, true, false ),
			vec!( true, true, false ),
			vec!( false, false, true ),
		);
		let dataset = Dataset::from_bools( &observations, 3 );

		let soft = model.soft_assignment( &dataset ).expect( "widths match" );
		let hard = model.hard_assignment( &dataset ).expect( "widths match" );
		assert_eq!( soft.len(), dataset.len() );
		assert_eq!( hard.len(), dataset.len() );
		for (probabilities, label) in soft.iter().zip( hard.iter() ) {
			let total: f64 = probabilities.iter().sum();
			assert_approx!( total, 1.0, 1e-9 );
			assert_approx!( probabilities[ *label ], probabilities[ 0 ].max( probabilities[ 1 ] ), 0.0 );
		}
	}

	#[test]
	/// A single update reproduces the closed-form maximum likelihood estimate
	fn test_single_update_matches_mle() {
		let mut model = BernoulliMixture::new( vec!( 1.0 ), vec!( vec!( 0.5, 0.5 )))
			.expect( "parameters are valid" );
		let observations = vec!(
			vec!( true, false ),
			vec!( true, true ),
			vec!( false, false ),
		);
		let dataset = Dataset::from_bools( &observations, 2 );

		let options = FitOptions{ iteration_limit: Some( 1 ), convergence_threshold: 0.0, trace_likelihood: false };
		let (loglik, status) = model.fit( &dataset, &options ).expect( "fit succeeds" );

		// the returned likelihood belongs to the parameters before the update
		assert_approx!( loglik, 3.0 * 0.25_f64.ln(), 1e-12 );
		assert!( !status.converged );
		assert_eq!( status.number_of_iterations, 1 );
		assert_approx!( model.mixing_coefficients()[ 0 ], 1.0, 1e-12 );
		assert_approx!( model.emission_probabilities()[ 0 ][ 0 ], 2.0 / 3.0, 1e-12 );
		assert_approx!( model.emission_probabilities()[ 0 ][ 1 ], 1.0 / 3.0, 1e-12 );
	}

	#[test]
	/// The log likelihood never decreases across updates, up to floating point noise
	fn test_likelihood_is_monotone_during_fit() {
		let (dataset, _labels) = generating_model().sample( 300, Some( 7 ));
		let mut model = BernoulliMixture::random( 2, 3, Some( 11 ));

		let options = FitOptions{ trace_likelihood: true, ..FitOptions::default() };
		let (_loglik, status) = model.fit( &dataset, &options ).expect( "fit succeeds" );

		let trace = status.likelihood_trace.expect( "trace was requested" );
		assert_eq!( trace.len() as u64, status.number_of_iterations );
		for pair in trace.windows( 2 ) {
			assert!( pair[ 1 ] - pair[ 0 ] >= -1e-9,
				"likelihood dropped from {} to {}", pair[ 0 ], pair[ 1 ] );
		}
	}

	#[test]
	/// Fitting sampled data recovers the generating parameters up to label permutation
	fn test_fit_recovers_generating_model() {
		let generator = generating_model();
		let (dataset, _labels) = generator.sample( 500, Some( 42 ));

		let mut model = BernoulliMixture::new(
			vec!( 0.6, 0.4 ),
			vec!( vec!( 0.8, 0.2, 0.5 ), vec!( 0.2, 0.8, 0.5 )),
		).expect( "parameters are valid" );
		let (_loglik, status) = model.fit( &dataset, &FitOptions::default() ).expect( "fit succeeds" );
		assert!( status.converged, "expected convergence within the iteration budget" );

		let fitted = model.emission_probabilities();
		let truth = generator.emission_probabilities();
		let direct = row_distance( &fitted[ 0 ], &truth[ 0 ] ).max( row_distance( &fitted[ 1 ], &truth[ 1 ] ));
		let swapped = row_distance( &fitted[ 0 ], &truth[ 1 ] ).max( row_distance( &fitted[ 1 ], &truth[ 0 ] ));
		let divergence = direct.min( swapped );
		assert!( divergence <= 0.1, "emission rows diverge by {divergence}" );

		// parameter invariants hold after fitting
		let total: f64 = model.mixing_coefficients().iter().sum();
		assert_approx!( total, 1.0, 1e-9 );
		for coefficient in model.mixing_coefficients() {
			assert!( (0.0 ..= 1.0).contains( coefficient ));
		}
		for probabilities in model.emission_probabilities() {
			for probability in probabilities {
				assert!( (0.0 ..= 1.0).contains( probability ));
			}
		}
	}

	#[test]
	/// Refitting a converged model converges again immediately
	fn test_convergence_is_idempotent() {
		let (dataset, _labels) = generating_model().sample( 400, Some( 3 ));
		let mut model = BernoulliMixture::new(
			vec!( 0.6, 0.4 ),
			vec!( vec!( 0.8, 0.2, 0.5 ), vec!( 0.2, 0.8, 0.5 )),
		).expect( "parameters are valid" );

		let (_loglik, status) = model.fit( &dataset, &FitOptions::default() ).expect( "fit succeeds" );
		assert!( status.converged );

		let (_loglik, status) = model.fit( &dataset, &FitOptions::default() ).expect( "fit succeeds" );
		assert!( status.converged );
		assert!( status.number_of_iterations <= 1,
			"expected immediate convergence, took {} iterations", status.number_of_iterations );
	}

	#[test]
	/// A zero iteration budget reports the likelihood without touching the parameters
	fn test_zero_iteration_budget() {
		let model_before = two_component_model();
		let mut model = model_before.clone();
		let dataset = Dataset::from_bools( &[ vec!( true, false, true ), vec!( false, true, false ) ], 3 );

		let options = FitOptions{ iteration_limit: Some( 0 ), ..FitOptions::default() };
		let (loglik, status) = model.fit( &dataset, &options ).expect( "fit succeeds" );

		assert!( !status.converged );
		assert_eq!( status.number_of_iterations, 0 );
		let expected = model_before.log_likelihood( &dataset ).expect( "widths match" );
		assert_approx!( loglik, expected, 1e-12 );
		assert_eq!( model.mixing_coefficients(), model_before.mixing_coefficients() );
	}

	#[test]
	fn test_aic_bic_formulas() {
		let model = two_component_model();
		let observations = vec!(
			vec!( true, false, true ),
			vec!( false, true, false ),
			vec!( true, true, true ),
			vec!( false, false, false ),
		);
		let dataset = Dataset::from_bools( &observations, 3 );

		let loglik = model.log_likelihood( &dataset ).expect( "widths match" );
		let free_parameters = model.number_of_free_parameters() as f64;
		assert_approx!( free_parameters, 7.0, 0.0 );

		let aic = model.aic( &dataset ).expect( "widths match" );
		assert_approx!( aic, -2.0 * loglik + 2.0 * free_parameters, 1e-9 );

		let bic = model.bic( &dataset ).expect( "widths match" );
		assert_approx!( bic, -2.0 * loglik + 4.0_f64.ln() * free_parameters, 1e-9 );
	}

	#[test]
	/// Seeded sampling is reproducible and labels refer to existing components
	fn test_sampling_reproducibility() {
		let model = generating_model();
		let (first_rows, first_labels) = model.sample( 100, Some( 5 ));
		let (second_rows, second_labels) = model.sample( 100, Some( 5 ));

		assert_eq!( first_rows.len(), 100 );
		assert_eq!( first_rows.width(), 3 );
		assert_eq!( first_rows.rows(), second_rows.rows() );
		assert_eq!( first_labels, second_labels );
		for label in &first_labels {
			assert!( *label < model.number_of_components() );
		}

		let (other_rows, other_labels) = model.sample( 100, Some( 6 ));
		assert!( first_rows.rows() != other_rows.rows() || first_labels != other_labels );
	}

	#[test]
	/// Every entry point rejects data of the wrong width
	fn test_dimension_mismatch_is_reported() {
		let mut model = two_component_model();
		let narrow = Dataset::from_bools( &[ vec!( true, false ) ], 2 );

		assert_eq!( model.log_likelihood( &narrow ), Err( MixtureError::DimensionMismatch{ expected: 3, got: 2 } ));
		assert!( matches!( model.soft_assignment( &narrow ), Err( MixtureError::DimensionMismatch{ expected: 3, got: 2 } )));
		assert!( matches!( model.hard_assignment( &narrow ), Err( MixtureError::DimensionMismatch{ expected: 3, got: 2 } )));
		assert!( matches!( model.aic( &narrow ), Err( MixtureError::DimensionMismatch{ expected: 3, got: 2 } )));
		assert!( matches!( model.bic( &narrow ), Err( MixtureError::DimensionMismatch{ expected: 3, got: 2 } )));
		assert!( matches!( model.fit( &narrow, &FitOptions::default() ), Err( MixtureError::DimensionMismatch{ expected: 3, got: 2 } )));
	}

	#[test]
	fn test_random_initialization_is_valid() {
		let model = BernoulliMixture::random( 3, 5, Some( 17 ));
		assert_eq!( model.number_of_components(), 3 );
		assert_eq!( model.number_of_dimensions(), 5 );
		let total: f64 = model.mixing_coefficients().iter().sum();
		assert_approx!( total, 1.0, 1e-9 );
		for probabilities in model.emission_probabilities() {
			for probability in probabilities {
				assert!( (0.05 .. 0.95).contains( probability ));
			}
		}

		// the same seed creates the same model
		let twin = BernoulliMixture::random( 3, 5, Some( 17 ));
		assert_eq!( model.emission_probabilities(), twin.emission_probabilities() );
	}

	fn row_distance( left: &[f64], right: &[f64] ) -> f64 {
		left.iter().zip( right.iter() )
			.map( |(left, right)| (left - right).abs() )
			.fold( 0.0, f64::max )
	}
}
