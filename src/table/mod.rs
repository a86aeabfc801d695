// src/table/mod.rs

pub mod read;
pub mod write;

pub use read::{read_input, InputRow};
pub use write::write_records;
