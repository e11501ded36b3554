//! Impls - port implementations for development and tests.
//!
//! Production media services live with the client that embeds this crate.

pub mod inmem_media;

pub use self::inmem_media::InMemoryMediaService;
