pub mod alleles;
pub mod predict;
