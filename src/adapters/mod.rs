//! Thin transport adapters around the dispatcher.
//!
//! The dispatch core is transport-agnostic; an adapter's whole job is to
//! extract the question text, call [`crate::dispatch::Dispatcher::handle`]
//! and serialize the envelope or error back out.

pub mod stdio;
