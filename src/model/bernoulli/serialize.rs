
use serde;
use serde::ser::SerializeStruct;

use crate::Loggable;
use crate::io::PrettyFormatter;

use super::BernoulliMixture;

/// Renders a mixture model line by line for logs and console output
pub struct BernoulliFormatter {
	show_mixing: bool,
	show_emissions: bool,
}

impl PrettyFormatter<BernoulliMixture> for BernoulliFormatter {

	fn format_pretty( &self, model: &BernoulliMixture ) -> String {
		let mut output = String::new();
		output.push( '\n' ); // so output begins on a new line

		if self.show_mixing {
			output = model.mixing_coefficients().iter().enumerate()
				.map( |(component, coefficient)| format_mixing( component, *coefficient ))
				.fold( output, |accumulator, line| join_lines( accumulator, line ));
		}

		if self.show_emissions {
			output = model.emission_probabilities().iter().enumerate()
				.map( |(component, probabilities)| format_emissions( component, probabilities ))
				.fold( output, |accumulator, line| join_lines( accumulator, line ));
		}
		output
	}
}

impl serde::Serialize for BernoulliMixture {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
		let mut record = serializer.serialize_struct( "BernoulliMixture", 2 )?;
		record.serialize_field( "mixing_coefficients", self.mixing_coefficients() )?;
		record.serialize_field( "emission_probabilities", self.emission_probabilities() )?;
		record.end()
	}
}

impl Loggable for BernoulliMixture {
	fn log( &self, message: &str, level: tracing::Level ) {
		let mut formatter = BernoulliFormatter::new();
		formatter.show_mixing();
		formatter.show_emissions();
		let rendering = formatter.format_pretty( self );
		match level {
			tracing::Level::TRACE => tracing::trace!( "{message}: {rendering}" ),
			tracing::Level::DEBUG => tracing::debug!( "{message}: {rendering}" ),
			_ => tracing::info!( "{message}: {rendering}" ),
		}
	}
}

fn format_mixing( component: usize, coefficient: f64 ) -> String {
	format!( "{component}:  pi {coefficient:.3}" )
}

fn format_emissions( component: usize, probabilities: &[f64] ) -> String {
	let rendered: Vec<String> = probabilities.iter()
		.map( |probability| format!( "{probability:.3}" ))
		.collect();
	format!( "{component}:  emit {}", rendered.join( " " ))
}

fn join_lines( mut accumulator: String, addition: String ) -> String {
	accumulator.push_str( addition.as_str() );
	accumulator.push( '\n' );
	accumulator
}

impl BernoulliFormatter {
	pub fn new() -> BernoulliFormatter {
		BernoulliFormatter{
			show_mixing: false,
			show_emissions: false,
		}
	}

	pub fn show_mixing( &mut self ) { self.show_mixing = true; }
	pub fn show_emissions( &mut self ) { self.show_emissions = true; }
}

impl Default for BernoulliFormatter {
	fn default() -> BernoulliFormatter {
		BernoulliFormatter::new()
	}
}
