use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Time-based task id (`t<unix-millis>`).
///
/// Ids are strictly increasing within the process: two calls in the same
/// millisecond get consecutive values instead of colliding.
pub fn generate_task_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    let mut last = LAST_ISSUED.load(Ordering::Relaxed);
    loop {
        let next = millis.max(last + 1);
        match LAST_ISSUED.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return format!("t{next}"),
            Err(actual) => last = actual,
        }
    }
}
