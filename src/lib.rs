//! Keeps track of food points eaten during the day. Recipes are logged against the current day,
//! the total is compared with a daily goal and a week of history is kept around.
//!
//! Everything is stored locally through [store::KeyValueStore].

pub mod cli;
pub mod store;
pub mod tracker;
pub mod utils;
