mod command;
mod error;
