#![forbid(unsafe_code)]

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod logging;
pub mod model;
pub mod session;
pub mod state;
pub mod view;
