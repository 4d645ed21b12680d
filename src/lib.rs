pub mod buffer;
pub mod config;
pub mod humanize;
pub mod observability;
