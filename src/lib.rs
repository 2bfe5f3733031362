// src/lib.rs

//! Resolve named tasks from layered `.tasks`/`tasks.ini` configuration
//! files, apply conditional overrides for the current file type, OS, profile
//! and features, and expand command templates by macro substitution.

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
