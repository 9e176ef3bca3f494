// Terminal task board: an in-memory task store seeded from a JSON document,
// a controller that derives filtered views and weekly summaries from it, and
// a ratatui front end.

pub mod app;
pub mod config;
pub mod logging;
