pub mod engine;
pub mod path;
pub mod progress;
pub mod runner;
pub mod worker;
