pub mod config;
pub mod error;
pub mod server;
pub mod sheet;

#[cfg(test)]
mod test_upstream;

pub use config::{Config, TokenizerMode};
pub use error::SheetError;
