pub mod comparison;
pub mod evaluation;
pub mod figure;
pub mod partition;
pub mod report;
pub mod subplot;
