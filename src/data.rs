
use bit_set::BitSet;
use bit_vec::BitVec;
use rustc_hash::FxHashMap;

/// A single binary observation. Set bits mark the dimensions that are on.
pub type Row = BitSet;
pub type Count = u64;

#[derive( Debug, Clone )]
/// Fixed-width matrix of binary observations.
pub struct Dataset {
	rows: Vec<Row>,
	width: usize,
}

#[derive( Debug )]
/// Unique rows of a data set together with their occurrence counts.
/// Weights sum to the number of rows of the data set they were derived from.
pub struct AggregatedDataset {
	rows: Vec<Row>,
	weights: Vec<Count>,
	width: usize,
}

impl Dataset {

	/// Wraps rows of the given width. Panics if a row has a set bit beyond the width.
	pub fn new( rows: Vec<Row>, width: usize ) -> Dataset {
		for row in &rows {
			assert!( row.iter().all( |dimension| dimension < width ), "rows fit the declared width" );
		}
		Dataset{ rows, width }
	}

	/// Builds a data set from explicit truth values, one slice per observation
	pub fn from_bools <R: AsRef<[bool]>> ( observations: &[R], width: usize ) -> Dataset {
		let rows = observations.iter()
			.map( |bits| row_from_bools( bits.as_ref() ))
			.collect();
		Dataset::new( rows, width )
	}

	pub fn len( &self ) -> usize {
		self.rows.len()
	}

	pub fn is_empty( &self ) -> bool {
		self.rows.is_empty()
	}

	pub fn width( &self ) -> usize {
		self.width
	}

	pub fn rows( &self ) -> &[Row] {
		&self.rows
	}

	/// Collapses the data set into unique rows with occurrence counts.
	/// Rows are keyed by their exact packed bit content, so deduplication is exact.
	pub fn aggregate( &self ) -> AggregatedDataset {
		let mut index: FxHashMap<BitVec, usize> = FxHashMap::default();
		let mut rows: Vec<Row> = Vec::new();
		let mut weights: Vec<Count> = Vec::new();
		for row in &self.rows {
			let key = pack_row( row, self.width );
			match index.get( &key ) {
				Some( position ) => weights[ *position ] += 1,
				None => {
					index.insert( key, rows.len() );
					rows.push( row.clone() );
					weights.push( 1 );
				},
			}
		}
		AggregatedDataset{ rows, weights, width: self.width }
	}
}

impl AggregatedDataset {

	pub fn len( &self ) -> usize {
		self.rows.len()
	}

	pub fn width( &self ) -> usize {
		self.width
	}

	pub fn rows( &self ) -> &[Row] {
		&self.rows
	}

	pub fn weights( &self ) -> &[Count] {
		&self.weights
	}

	/// Number of rows of the original data set
	pub fn total_weight( &self ) -> Count {
		self.weights.iter().sum()
	}
}

/// Creates a row with a set bit for every true entry
pub fn row_from_bools( bits: &[bool] ) -> Row {
	let mut row = Row::with_capacity( bits.len() );
	for (dimension, is_on) in bits.iter().enumerate() {
		if *is_on {
			row.insert( dimension );
		}
	}
	row
}

/// Packs a row into a bit vector of the full data set width.
/// Rows that differ only in internal capacity pack to the same key.
fn pack_row( row: &Row, width: usize ) -> BitVec {
	let mut packed = BitVec::from_elem( width, false );
	for dimension in row.iter() {
		packed.set( dimension, true );
	}
	packed
}
