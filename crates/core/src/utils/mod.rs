pub mod json_lookup;

pub use json_lookup::Lookup;
