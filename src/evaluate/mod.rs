pub mod cross_validation;
pub mod grid;
pub mod report;
