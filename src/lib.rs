pub mod config;
pub mod db;
pub mod error;
pub mod load;
pub mod table;
pub mod utils;
