//! Library crate for runboard, exposing modules for the binary and integration tests.

pub mod codec;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod views;
