//! # Web API Request Handlers

pub mod commands;
