//! 工具模块

/// `DateTime<Utc>` serde helpers.
pub mod datetime;
