//! TubeDesk - management backend for YouTube channels, ad campaigns and team workflows
//!
//! This library provides the core functionality for the TubeDesk backend:
//! a JSON API over channels, videos, ad campaigns, revenue records and
//! internal tasks, authenticated with bearer tokens.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
