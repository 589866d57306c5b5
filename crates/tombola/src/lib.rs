pub mod config;
pub mod entries;
pub mod events;
pub mod gui;
pub mod spin;
pub mod sys;

mod macros;
