pub mod fetch;
pub mod flatten;
pub mod run;
pub mod table;
