//! Tabular results - the record set handed to the CSV writer and sheet sync.

mod csv_store;
mod tabular_model;


pub use csv_store::{read_csv, write_csv, CsvDirectory};
pub use tabular_model::{coerce_value, render_cell, Coercion, Record, Table};
