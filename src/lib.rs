// src/lib.rs

//! Game launcher library
//!
//! Keeps a game client up to date and surfaces the game server's news,
//! boosted creatures, event countdowns and player count.

pub mod error;
pub mod launcher;
pub mod models;
pub mod services;
pub mod storage;
pub mod updater;
pub mod utils;
