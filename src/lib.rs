pub mod api;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod routes;
pub mod storage;
pub mod web;
