use std::time::SystemTime;

pub trait SystemTimeExt {
    /// Milliseconds since the Unix epoch, clamped to zero for earlier instants.
    fn to_epoch_millis(&self) -> u64;
}

impl SystemTimeExt for SystemTime {
    fn to_epoch_millis(&self) -> u64 {
        self.duration_since(SystemTime::UNIX_EPOCH)
            .ok()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}
