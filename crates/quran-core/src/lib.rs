pub mod api;
pub mod browse;
pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod favorites;
pub mod model;
pub mod platform;
pub mod player;
pub mod prober;
pub mod sequencer;
