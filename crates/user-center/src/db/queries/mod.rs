//! Database queries, organized by table.

pub mod user;
