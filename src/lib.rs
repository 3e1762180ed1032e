//! cogbot - a chat bot host whose features live in hot-reloadable cogs

pub mod application;
pub mod cogs;
pub mod domain;
pub mod infrastructure;
