pub mod cli;
pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod history;
pub mod hungarian;
pub mod play;
pub mod player;
pub mod probability;
pub mod session;
pub mod strategy;
