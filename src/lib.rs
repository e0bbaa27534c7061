pub mod aws;
pub mod cli;
pub mod distribution;
pub mod load_config;
pub mod upload;

pub use cli::{run, Cli};
