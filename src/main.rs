
use clap::Parser;
use tracing::info;

use bernmix::*;
use bernmix::io::PrettyFormatter;

#[derive( Parser, Debug )]
#[command( about = "Fits a Bernoulli mixture model to a binary data set" )]
struct Arguments {
	/// path to the data set in FIMI format, one line of set dimensions per row
	data: String,
	/// number of mixture components
	#[arg( short = 'k', long, default_value_t = 2 )]
	components: usize,
	/// minimum number of dimensions, grown to fit the data
	#[arg( short = 'd', long, default_value_t = 0 )]
	dimensions: usize,
	/// maximum number of EM iterations, 0 runs until convergence
	#[arg( short = 'i', long, default_value_t = 1000 )]
	iterations: u64,
	/// absolute log likelihood delta that marks convergence
	#[arg( short = 't', long, default_value_t = 1e-6 )]
	threshold: f64,
	/// seed for the random initialization and for sampling
	#[arg( short, long )]
	seed: Option<u64>,
	/// record the log likelihood of every iteration
	#[arg( long )]
	trace: bool,
	/// write the fitted model as JSON to this path
	#[arg( short, long )]
	output: Option<String>,
}

fn main() -> Result<(), String> {
	prepare_logging();
	let arguments = Arguments::parse();

	let dataset = io::read_dataset( &arguments.data, arguments.dimensions )?;
	info!( "read {} rows of width {}", dataset.len(), dataset.width() );

	let mut model = BernoulliMixture::random( arguments.components, dataset.width(), arguments.seed );
	let options = FitOptions{
		iteration_limit: if arguments.iterations == 0 { None } else { Some( arguments.iterations ) },
		convergence_threshold: arguments.threshold,
		trace_likelihood: arguments.trace,
	};

	let (loglik, status) = model.fit( &dataset, &options ).map_err( |err| err.to_string() )?;
	info!( "fit finished: {} with log likelihood {:.6}", status, loglik );
	if let Some( trace ) = status.likelihood_trace.as_ref() {
		for (iteration, loglik) in trace.iter().enumerate() {
			info!( "iteration {}: {:.6}", iteration + 1, loglik );
		}
	}

	let aic = model.aic( &dataset ).map_err( |err| err.to_string() )?;
	let bic = model.bic( &dataset ).map_err( |err| err.to_string() )?;
	info!( "AIC {:.3} / BIC {:.3} with {} free parameters", aic, bic, model.number_of_free_parameters() );

	let mut formatter = BernoulliFormatter::new();
	formatter.show_mixing();
	formatter.show_emissions();
	println!( "{}", formatter.format_pretty( &model ));

	if let Some( path ) = arguments.output.as_ref() {
		io::write_model( &model, path )?;
		info!( "wrote model to {}", path );
	}

	Ok( () )
}

fn prepare_logging() {
	let tracer = tracing_subscriber::fmt::fmt()
		.with_max_level( tracing_subscriber::filter::LevelFilter::INFO )
		.finish();
	tracing::subscriber::set_global_default( tracer ).unwrap();
}
