//! Command-line client for the Opsicle automation controller.

pub mod app;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod render;
pub mod select;
pub mod shutdown;
pub mod tui;
