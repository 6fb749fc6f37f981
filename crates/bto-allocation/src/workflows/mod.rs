pub mod allocation;
pub mod dataset;
