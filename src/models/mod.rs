pub mod health;
pub mod keyword;
pub mod search;
pub mod snapshot;
pub mod tracked;
