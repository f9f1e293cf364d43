pub mod broadcaster;
pub mod directive;
pub mod handler;
pub mod registry;
