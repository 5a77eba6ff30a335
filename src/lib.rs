pub mod catalog;
pub mod download;
pub mod driver;
pub mod generate;
pub mod prompt;
