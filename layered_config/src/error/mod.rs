//! Error types produced by providers, the schema applier and the façade.

mod constructors;
mod conversions;
mod types;

pub use types::ConfigError;

#[cfg(test)]
mod tests;
