//! Actor system behind `pagepack serve`.
//!
//! ```text
//! FsActor --> BuilderActor --> WsActor
//! (watch)      (build)       (broadcast)
//! ```
//!
//! - `messages` - message types between actors
//! - `fs` - file watcher with debouncing
//! - `builder` - single-flight rebuilds into the session
//! - `ws` - WebSocket clients and broadcast
//! - `coordinator` - wires up and runs the actors

pub mod builder;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
