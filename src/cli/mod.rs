pub mod app;
pub mod check;
pub mod commands;
pub mod env;
pub mod output;
pub mod route;
pub mod runtime;
