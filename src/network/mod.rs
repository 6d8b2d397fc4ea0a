//! Network Module
//!
//! TCP server, per-client connection handling and a blocking client.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls a shutdown flag)
//! - Fixed worker thread pool fed over a bounded crossbeam channel
//! - Commands routed through Engine

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::Client;
