pub mod assets;
pub mod config;
pub mod engine;
pub mod prices;
pub mod projects;
pub mod rules;
