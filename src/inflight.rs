use std::sync::atomic::{AtomicBool, Ordering};

use crate::AuthError;

/// Rejects a second invocation of the same mutation while one is pending.
///
/// One action instance stands for one client affordance (a submit button);
/// a repeated submit while the first is suspended fails with
/// `AuthError::RequestInFlight` instead of racing it.
#[derive(Debug, Default)]
pub(crate) struct InFlight(AtomicBool);

pub(crate) struct InFlightGuard<'a>(&'a AtomicBool);

impl InFlight {
    pub(crate) fn begin(&self) -> Result<InFlightGuard<'_>, AuthError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(&self.0))
            .map_err(|_| AuthError::RequestInFlight)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_rejected_until_guard_drops() {
        let flight = InFlight::default();
        let guard = flight.begin().unwrap();
        assert!(matches!(flight.begin(), Err(AuthError::RequestInFlight)));
        drop(guard);
        assert!(flight.begin().is_ok());
    }
}
