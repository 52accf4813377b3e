pub mod chart;
pub mod domain;
pub mod format;
