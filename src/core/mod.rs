pub mod app;
pub mod config;
pub mod oracle;
pub mod paths;
pub mod transcript;
