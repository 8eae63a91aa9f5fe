//! Streaming module for bounded-memory matching
//!
//! This module provides the streaming primitives the engine is built on:
//! - Fixed-capacity ring buffer for held bytes
//! - Needle compilation and the KMP prefix function
//! - Line break normalization as a byte pre-filter

pub mod linebreak;
pub mod pattern_fsm;
pub mod ring_buffer;

pub use linebreak::LineBreakNormalizer;
pub use pattern_fsm::{Needle, NeedleError, Pattern, PrefixTable};
pub use ring_buffer::RingBuffer;
