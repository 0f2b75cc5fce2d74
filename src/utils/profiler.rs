use std::time::Instant;

/// Logs how long a scope took, at trace level, when dropped.
#[derive(Debug)]
pub struct ScopeTimer {
    name: &'static str,
    start: Instant,
}

impl ScopeTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopeTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        log::trace!("[TIMER] {} took {:?}", self.name, elapsed);
    }
}
