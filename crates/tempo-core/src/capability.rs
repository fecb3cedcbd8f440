//! Platform capabilities consumed by the engine.
//!
//! Audio, notifications and the screen wake lock are all optional. Each has a
//! `Noop*` fallback and every failure is swallowed by the engine: the timer
//! keeps correct time even when none of these work.

use tracing::debug;

use crate::error::CapabilityError;

/// Produces one short alarm tone (a chord or equivalent).
pub trait ToneProducer {
    /// `volume` is in 0.0..=1.0.
    fn play_tone(&mut self, volume: f64) -> Result<(), CapabilityError>;
}

pub trait Notifier {
    /// Whether permission has already been granted. The engine never prompts.
    fn is_permitted(&self) -> bool;

    fn show(&mut self, title: &str, body: &str) -> Result<(), CapabilityError>;
}

/// Opaque handle for an acquired wake lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeLockHandle(pub u64);

pub trait WakeLock {
    fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError>;
    fn release(&mut self, handle: WakeLockHandle) -> Result<(), CapabilityError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTone;

impl ToneProducer for NoopTone {
    fn play_tone(&mut self, _volume: f64) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unavailable("audio"))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn is_permitted(&self) -> bool {
        false
    }

    fn show(&mut self, _title: &str, _body: &str) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unavailable("notification"))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError> {
        Err(CapabilityError::Unavailable("wake lock"))
    }

    fn release(&mut self, _handle: WakeLockHandle) -> Result<(), CapabilityError> {
        Ok(())
    }
}

/// Who is keeping the screen awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeHolder {
    Countdown,
    Stopwatch,
}

/// The single shared wake lock.
///
/// Acquired when the first holder starts running, released once no holder
/// remains. If acquisition failed, a later `hold` retries.
pub struct WakeLockManager {
    lock: Box<dyn WakeLock>,
    handle: Option<WakeLockHandle>,
    countdown: bool,
    stopwatch: bool,
}

impl WakeLockManager {
    pub fn new(lock: Box<dyn WakeLock>) -> Self {
        Self {
            lock,
            handle: None,
            countdown: false,
            stopwatch: false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_holding(&self, holder: WakeHolder) -> bool {
        match holder {
            WakeHolder::Countdown => self.countdown,
            WakeHolder::Stopwatch => self.stopwatch,
        }
    }

    pub fn hold(&mut self, holder: WakeHolder) {
        self.set_holder(holder, true);
        if self.handle.is_none() {
            match self.lock.acquire() {
                Ok(handle) => self.handle = Some(handle),
                Err(e) => debug!(error = %e, "wake lock not acquired"),
            }
        }
    }

    pub fn let_go(&mut self, holder: WakeHolder) {
        self.set_holder(holder, false);
        if self.countdown || self.stopwatch {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.lock.release(handle) {
                debug!(error = %e, "wake lock release failed");
            }
        }
    }

    fn set_holder(&mut self, holder: WakeHolder, held: bool) {
        match holder {
            WakeHolder::Countdown => self.countdown = held,
            WakeHolder::Stopwatch => self.stopwatch = held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counts {
        acquired: u32,
        released: u32,
    }

    struct CountingLock(Rc<RefCell<Counts>>);

    impl WakeLock for CountingLock {
        fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError> {
            let mut c = self.0.borrow_mut();
            c.acquired += 1;
            Ok(WakeLockHandle(u64::from(c.acquired)))
        }

        fn release(&mut self, _handle: WakeLockHandle) -> Result<(), CapabilityError> {
            self.0.borrow_mut().released += 1;
            Ok(())
        }
    }

    #[test]
    fn shared_lock_released_only_when_both_stop() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut mgr = WakeLockManager::new(Box::new(CountingLock(counts.clone())));

        mgr.hold(WakeHolder::Countdown);
        mgr.hold(WakeHolder::Stopwatch);
        assert_eq!(counts.borrow().acquired, 1);

        mgr.let_go(WakeHolder::Countdown);
        assert!(mgr.is_held());
        assert_eq!(counts.borrow().released, 0);

        mgr.let_go(WakeHolder::Stopwatch);
        assert!(!mgr.is_held());
        assert_eq!(counts.borrow().released, 1);
    }

    #[test]
    fn unavailable_lock_is_non_fatal() {
        let mut mgr = WakeLockManager::new(Box::new(NoopWakeLock));
        mgr.hold(WakeHolder::Countdown);
        assert!(!mgr.is_held());
        assert!(mgr.is_holding(WakeHolder::Countdown));
        mgr.let_go(WakeHolder::Countdown);
        assert!(!mgr.is_holding(WakeHolder::Countdown));
    }
}
