//! genai-relay: HTTP relay between clients and a generative model.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
