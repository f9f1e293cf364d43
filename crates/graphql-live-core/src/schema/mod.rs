pub mod connection;
pub mod edges;
pub mod global_id;
pub mod guards;
pub mod types;
