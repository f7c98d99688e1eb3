#![forbid(unsafe_code)]

pub mod capture;
pub mod catalog;
pub mod mistakes;
pub mod model;
pub mod scheduler;
pub mod score;
pub mod snapshot;
pub mod state;
pub mod study;
pub mod time;

pub use time::Clock;
