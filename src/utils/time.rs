use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Current instant in the column type used by every timestamp.
pub fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}
