pub mod dataset;
pub mod download;
pub mod warehouse;
