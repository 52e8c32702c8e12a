//! Domain layer containing game rules and session state.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, validation errors)
//! - `game` - Board, marks, results and win/draw evaluation
//! - `session` - One game's mutable state and seat assignment

pub mod foundation;
pub mod game;
pub mod session;
