//! Input loaders for the two record kinds the engine consumes: news items
//! (JSON) and commercial metric rows (wide CSV).

pub mod metrics;
pub mod news;
