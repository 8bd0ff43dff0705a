//! Parcel manifest validation
//!
//! Builds a manifest, coerces it, repairs a broken one with a transform and
//! prints every violation of a manifest that cannot be repaired.
//!
//! Run with: cargo run --example parcels

use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array, Int64Array};
use arrow::datatypes::Float64Type;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use safe_frame::prelude::*;
use tracing::Level;

columns! {
    /// Columns of a parcel manifest
    pub struct ParcelColumns {
        id => "id",
        weight => "weight",
    }
}

impl ColumnDeclaration for ParcelColumns {
    fn get_data_schema(&self) -> Schema {
        Schema::builder()
            .column(&self.id, Column::new(DType::Utf8).unique())
            .column(&self.weight, Column::new(DType::Float64))
            .coerce(true)
            .build()
    }
}

type Parcels = ValidatedFrame<ParcelColumns>;

fn manifest(ids: Vec<i64>, weights: Vec<Option<f64>>) -> Result<RecordBatch, Error> {
    Ok(RecordBatch::try_from_iter([
        ("id", Arc::new(Int64Array::from(ids)) as ArrayRef),
        ("weight", Arc::new(Float64Array::from(weights)) as ArrayRef),
    ])?)
}

fn print_batch(batch: &RecordBatch) -> Result<(), Error> {
    let schema = batch.schema();
    let names: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| format!("{} ({})", f.name(), f.data_type()))
        .collect();
    println!("  {}", names.join(" | "));

    let options = FormatOptions::default().with_null("null");
    let formatters = batch
        .columns()
        .iter()
        .map(|c| ArrayFormatter::try_new(c.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;
    for row in 0..batch.num_rows() {
        let cells: Vec<String> = formatters.iter().map(|f| f.value(row).to_string()).collect();
        println!("  {}", cells.join(" | "));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    println!("=== Coercion ===");
    let parcels = Parcels::new(manifest(vec![1, 2, 3], vec![Some(1.5), Some(0.2), Some(7.0)])?)?;
    print_batch(parcels.data())?;

    println!("\n=== Repair before validation ===");
    let columns = ParcelColumns::default();
    let weight = columns.weight.clone();
    let zero_missing = Pipeline::new()
        .then(from_fn("zero_missing_weights", move |data: RecordBatch| {
            let index = data.schema().index_of(&weight)?;
            let filled: Float64Array = data
                .column(index)
                .as_primitive::<Float64Type>()
                .iter()
                .map(|w| Some(w.unwrap_or(0.0)))
                .collect();
            let mut arrays = data.columns().to_vec();
            arrays[index] = Arc::new(filled);
            Ok(RecordBatch::try_new(data.schema(), arrays)?)
        }))
        .verbose(true);
    let raw = manifest(vec![4, 5], vec![None, Some(2.0)])?;
    let repaired = Parcels::from_frame(raw, Some(columns), Some(&zero_missing))?;
    print_batch(repaired.data())?;

    println!("\n=== Rejection ===");
    let raw = manifest(vec![6, 6, 7], vec![Some(1.0), None, None])?;
    match Parcels::new(raw) {
        Ok(_) => println!("unexpectedly valid"),
        Err(Error::Validation(err)) => {
            for violation in err.violations() {
                println!("  {}", violation);
            }
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
