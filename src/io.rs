
use std::path::Path;
use std::fs::File;
use std::io::{BufReader, BufRead, Write};

use serde_json as json;

use crate::data::{Dataset, Row};

/// Converts a structure into a string
pub trait PrettyFormatter<T> {
	fn format_pretty( &self, object: &T ) -> String;
}

/// Reads a FIMI style file into a data set: every line lists the set dimensions of one row.
/// The width grows to fit the greatest listed dimension, starting from the requested minimum.
pub fn read_dataset( path: &str, minimum_width: usize ) -> Result<Dataset, String> {
	let path = Path::new( path );
	let file = File::open( path ).map_err( |e| e.to_string() )?;
	let reader = BufReader::new( file );

	let mut rows: Vec<Row> = Vec::new();
	let mut width = minimum_width;
	for line in reader.lines() {
		let line = line.map_err( |e| e.to_string() )?;
		if line.trim().is_empty() {
			continue;
		}
		let row = parse_fimi_row( &line, " " ).ok_or_else( || format!( "cannot parse line: {}", line ))?;
		if let Some( greatest ) = row.iter().max() {
			width = width.max( greatest + 1 );
		}
		rows.push( row );
	}
	Ok( Dataset::new( rows, width ))
}

/// Parses dimension indices separated by splitter into a row
pub fn parse_fimi_row( line: &str, splitter: &str ) -> Option<Row> {
	let mut row = Row::new();
	for chunk in line.split( splitter ) {
		if chunk.is_empty() {
			continue;
		}
		match usize::from_str_radix( chunk, 10 ) {
			Ok( dimension ) => { row.insert( dimension ); },
			Err( _ ) => return None,
		}
	}
	Some( row )
}

/// Writes a serializeable model to a file
pub fn write_model<M: serde::Serialize>( model: &M, path: &str ) -> Result<(), String> {
	match serde_json::to_string( model ) {
		json::Result::Ok( model_string ) => {
			let path = Path::new( path );
			let mut file = File::create( path ).map_err( |err| err.to_string() )?;
			write!( file, "{}", model_string ).map_err( |err| err.to_string() )
		},
		json::Result::Err( err ) => Result::Err( err.to_string() ),
	}
}
