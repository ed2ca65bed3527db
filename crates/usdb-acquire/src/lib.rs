//! Retrieval pipeline for karaoke lyric files hosted on usdb.eu.
//!
//! A run logs in ([`session::UsdbSession::login`]), lists candidate songs
//! from the search page ([`search`]), then downloads each candidate's zip
//! archive and pulls out its first `.txt` entry ([`archive`]).
//! [`pipeline::fetch_songs`] ties the stages together.

pub mod archive;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod search;
pub mod session;

pub use config::{Credentials, UsdbConfig};
pub use error::{SoftFailure, Stage, UsdbError};
pub use pipeline::{fetch_songs, MAX_RESULTS};
