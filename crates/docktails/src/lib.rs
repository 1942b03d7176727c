// Module structure for docktails.

// Core infrastructure
pub mod docker;
pub mod client;
pub mod conf;
pub mod filter;
pub mod state;

// Tailing
pub mod output;
pub mod logs;
pub mod runtime;
pub mod cli;
