//! Kanban task-board engine.
//!
//! A [`Board`](board::Board) only changes through [`reducer::apply`], which takes a
//! [`Command`](reducer::Command) and returns the next board with an
//! [`Outcome`](reducer::Outcome). [`view`] derives filtered, sorted column listings,
//! [`db`] persists boards as JSON, and [`session::Session`] ties the two together.

pub mod board;
pub mod cli;
pub mod cmd;
pub mod column;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod ordering;
pub mod reducer;
pub mod session;
pub mod task;
pub mod timestamp;
pub mod view;
