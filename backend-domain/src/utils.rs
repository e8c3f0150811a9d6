// Shared time helpers

use chrono::Utc;

pub fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}
