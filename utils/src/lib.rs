use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Get the elapsed system time since the Unix Epoch in Milliseconds
pub fn get_epoch_time_in_ms() -> u64 {
    get_epoch_time().as_millis() as u64
}

fn get_epoch_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("SystemTime before UNIX EPOCH")
}
