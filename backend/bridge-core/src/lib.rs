pub mod config;
pub mod error;
pub mod input;
pub mod link;

#[cfg(test)]
mod tests;

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 6677;
pub const DEFAULT_SERVER_ADDRESS: &str =
    const_format::concatcp!(DEFAULT_SERVER_HOST, ":", DEFAULT_SERVER_PORT);
