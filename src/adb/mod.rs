pub mod client;
pub mod command;
pub mod device;
pub mod locator;
pub mod parse;
pub mod record;
pub mod runner;
