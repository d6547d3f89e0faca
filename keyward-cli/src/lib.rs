pub mod cli;
pub mod commands;
pub mod infrastructure;
pub mod secrets;
