//! Core business logic for Tutoria.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, calendar rules, and tuition calculations live here.
//!
//! # Modules
//!
//! - `schedule` - Lesson-day calendar rules and time windows
//! - `tuition` - Charge calculation, payment allocation, and debt summaries
//! - `auth` - Password hashing

pub mod auth;
pub mod schedule;
pub mod tuition;
