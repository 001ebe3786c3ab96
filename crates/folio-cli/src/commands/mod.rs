//! CLI command handlers

pub mod add;
pub mod facets;
pub mod get;
pub mod langs;
pub mod ls;
pub mod reload;
pub mod rm;
pub mod tag;
pub mod view;
