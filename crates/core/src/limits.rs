//! Size limits for log rows and aggregation results.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so field limits are duplicated on `LogEvent`. Keep both in sync when modifying.

/// Maximum append request body in bytes (8KB).
///
/// A single LogEvent is five short fields; anything larger is not an event.
pub const MAX_LOG_BODY_BYTES: usize = 8 * 1024;

/// User ID max length.
/// UUIDs=36, numeric ids are shorter.
pub const MAX_USER_ID_LEN: usize = 128;

/// Device identifier max length (the `session` column is VARCHAR(30)).
pub const MAX_DEVICE_ID_LEN: usize = 30;

/// Event type max length.
pub const MAX_EVENT_TYPE_LEN: usize = 64;

/// Filter identifier max length.
pub const MAX_FILTER_ID_LEN: usize = 128;

/// Number of most recent buckets returned by period queries.
pub const MAX_PERIOD_BUCKETS: usize = 30;
