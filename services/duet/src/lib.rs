//! Duet Service Library Crate
//!
//! Console front end for the interaction core: configuration, a simulated
//! audio device, a log-backed presentation and the input command parser. The
//! `duet` binary is a thin wrapper around this library.

pub mod command;
pub mod config;
pub mod playback;
pub mod presentation;
