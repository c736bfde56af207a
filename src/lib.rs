//! Newsroom - A news platform backend
//!
//! This library provides the core functionality for the Newsroom API.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
