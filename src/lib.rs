//! Mutiara - Company site service for PT. Mitra Mutiara Sejahtera
//!
//! News, moderated comments, the contact / recruitment inbox and the
//! admin panel behind a JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
