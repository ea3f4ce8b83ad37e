pub mod app;
pub mod cli;
pub mod config;
pub mod paths;
pub mod render;
pub mod segment;
