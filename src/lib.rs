//! cffc — compiler for the CFF state machine language.
//!
//! Turns a CFF program into a C++ class (declaration + implementation)
//! driven by a hand-written platform runtime.

pub mod cff;
pub mod config;
