mod controller;
mod runner;

pub use controller::Controller;
pub use runner::Runner;
