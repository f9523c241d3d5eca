pub mod app;
pub mod command;
pub mod config;
pub mod execution;
pub mod orchestration;
pub mod preprocessing;
pub mod shared;
pub mod source;
