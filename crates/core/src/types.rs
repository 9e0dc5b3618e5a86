/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier assigned to each accepted WebSocket connection.
pub type ConnId = String;
