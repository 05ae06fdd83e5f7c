//! Testdeck server library.
//!
//! Ingests CI test runs (JUnit-style XML) and coverage reports
//! (Cobertura-style XML), stores them per organization, repo and branch, and
//! serves summaries, day-bucketed trends and primary-branch comparisons.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
