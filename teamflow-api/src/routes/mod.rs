/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, password reset)
/// - `tasks`: Task board endpoints
/// - `projects`: Project registry endpoints
/// - `activity`: Activity ledger, stats and PDF report endpoints
/// - `users`: Profile and user administration endpoints
/// - `notifications`: Notification endpoints

pub mod health;
pub mod auth;
pub mod tasks;
pub mod projects;
pub mod activity;
pub mod users;
pub mod notifications;
