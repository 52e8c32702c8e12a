//! Tic-Tac-Toe Server - Real-time two-player game sessions
//!
//! Players connect over WebSocket to a named game, are seated as `O` or `X`,
//! and receive the board after every accepted move.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
