pub mod db;
pub mod exposure;
pub mod health;
pub mod keywords;
pub mod rank;
pub mod settings;
pub mod snapshot;
