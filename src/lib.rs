//! Record keeping for a group of residential care houses: residents and
//! staff, house assignments, work orders, appointments, inventory, and
//! recurring maintenance whose due dates and urgency are derived from the
//! last completion date.

#[macro_use]
mod labels;

pub mod error;
pub mod schedule;
pub mod models;
pub mod config;
pub mod logging;
pub mod storage;
pub mod clock;
pub mod facility;
pub mod filter;
pub mod board;
pub mod calendar;
pub mod seed;
pub mod commands;
pub mod tui;
