//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): the crate's error type
//! - [`Clock`](clock::Clock): injected time source
//! - [`run_blocking`](blocking::run_blocking): disk work off the executor

pub mod blocking;
pub mod clock;
pub mod context;
pub mod neterror;

#[cfg(test)]
mod tests;
