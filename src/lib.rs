//! Terminal timetable client for the Skoolway school-management backend.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod schedule;
pub mod tui;
