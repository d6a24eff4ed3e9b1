/// Milliseconds since the unix epoch, used for `_modified` and collection
/// attributes.
#[inline]
pub fn current_time_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
