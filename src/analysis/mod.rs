//! Statistics and chart construction over a loaded [`Table`](crate::data::model::Table).

pub mod chart;
pub mod summary;
