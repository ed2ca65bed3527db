//! Entry boundary for the lyrics search: turns an HTTP-shaped invocation
//! into a JSON response, and serves the same contract over HTTP.

pub mod handler;
pub mod server;

pub use handler::handle;
pub use server::{router, serve};
