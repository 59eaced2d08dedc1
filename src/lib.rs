pub mod access;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod judge;
pub mod pipeline;
pub mod report;
pub mod routes;
pub mod sandbox;
pub mod web_server;
