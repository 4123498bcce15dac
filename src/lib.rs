//! Stackd booking reminder service
//!
//! This module exposes the service components for testing purposes.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reminders;
pub mod routes;
pub mod services;
