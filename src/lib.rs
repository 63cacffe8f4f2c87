//! Oraculo -- a natural-language analytics gateway.
//!
//! Takes a free-text question, asks an LLM to classify it into one of a
//! fixed set of query intents, normalizes the extracted parameters against
//! a static schema, dispatches to the matching third-party integration
//! (GA4, Search Console, YouTube, Google Sheets, Trello) and optionally
//! narrates the result back in plain language with a second LLM call.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod dispatch;
pub mod integrations;

pub mod adapters;
