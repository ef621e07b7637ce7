/// Database models for Teamflow
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, the three-role lattice, and credential state
/// - `project`: Projects with the derived on-track summary
/// - `task`: Tasks and their status state machine
/// - `activity`: Append-only activity ledger and aggregate statistics
/// - `notification`: Per-user notification log

pub mod activity;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;
