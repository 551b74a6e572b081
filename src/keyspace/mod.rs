pub mod region;

pub use region::{DeltaObserver, Keyspace};

/// Milliseconds since the Unix epoch, the clock commands evaluate lazy
/// expiration against.
pub fn system_now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as i64,
        Err(_) => 0,
    }
}
