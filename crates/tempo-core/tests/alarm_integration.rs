//! Alarm, notification and wake-lock behavior driven through the engine.

use std::cell::RefCell;
use std::rc::Rc;

use tempo_core::{
    Capabilities, CapabilityError, EngineOptions, Event, ManualClock, MemoryBackend, MemoryStore,
    Notifier, SessionEngine, ToneProducer, WakeLock, WakeLockHandle,
};

const T0: u64 = 1_760_443_200_000;

#[derive(Default)]
struct Recorder {
    tones: Vec<f64>,
    notifications: Vec<(String, String)>,
    acquired: u32,
    released: u32,
}

struct FakeTone(Rc<RefCell<Recorder>>);

impl ToneProducer for FakeTone {
    fn play_tone(&mut self, volume: f64) -> Result<(), CapabilityError> {
        self.0.borrow_mut().tones.push(volume);
        Ok(())
    }
}

struct FakeNotifier {
    rec: Rc<RefCell<Recorder>>,
    permitted: bool,
}

impl Notifier for FakeNotifier {
    fn is_permitted(&self) -> bool {
        self.permitted
    }

    fn show(&mut self, title: &str, body: &str) -> Result<(), CapabilityError> {
        self.rec
            .borrow_mut()
            .notifications
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

struct FakeLock(Rc<RefCell<Recorder>>);

impl WakeLock for FakeLock {
    fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError> {
        let mut rec = self.0.borrow_mut();
        rec.acquired += 1;
        Ok(WakeLockHandle(u64::from(rec.acquired)))
    }

    fn release(&mut self, _handle: WakeLockHandle) -> Result<(), CapabilityError> {
        self.0.borrow_mut().released += 1;
        Ok(())
    }
}

struct BrokenTone;

impl ToneProducer for BrokenTone {
    fn play_tone(&mut self, _volume: f64) -> Result<(), CapabilityError> {
        Err(CapabilityError::Failed {
            name: "audio",
            message: "device busy".into(),
        })
    }
}

/// A platform that refuses the wake lock outright.
struct DeniedLock;

impl WakeLock for DeniedLock {
    fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError> {
        Err(CapabilityError::Denied("wake lock"))
    }

    fn release(&mut self, _handle: WakeLockHandle) -> Result<(), CapabilityError> {
        Err(CapabilityError::Denied("wake lock"))
    }
}

fn setup(permitted: bool) -> (SessionEngine, ManualClock, Rc<RefCell<Recorder>>, Rc<MemoryBackend>) {
    let clock = ManualClock::new(T0);
    let rec = Rc::new(RefCell::new(Recorder::default()));
    let backend = Rc::new(MemoryBackend::new());
    let caps = Capabilities {
        tone: Box::new(FakeTone(Rc::clone(&rec))),
        notifier: Box::new(FakeNotifier {
            rec: Rc::clone(&rec),
            permitted,
        }),
        wake_lock: Box::new(FakeLock(Rc::clone(&rec))),
    };
    let engine = SessionEngine::new(
        EngineOptions::default(),
        Box::new(MemoryStore::new()),
        Box::new(Rc::clone(&backend)),
    )
    .with_clock(clock.clone())
    .with_capabilities(caps);
    (engine, clock, rec, backend)
}

/// Shorten the focus run to a minute and let it finish.
fn run_to_completion(engine: &mut SessionEngine, clock: &ManualClock) -> Vec<Event> {
    engine.adjust_time(-24).unwrap();
    engine.start_countdown();
    clock.advance(60_000);
    engine.poll()
}

#[test]
fn completion_rings_and_repeats_until_acknowledged() {
    let (mut engine, clock, rec, _) = setup(false);
    let events = run_to_completion(&mut engine, &clock);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::AlarmActivated { retroactive: false, .. })));
    assert!(engine.is_ringing());
    assert!(engine.alarm_is_looping());
    assert_eq!(rec.borrow().tones.len(), 1);

    clock.advance(3_000);
    engine.poll();
    assert_eq!(rec.borrow().tones.len(), 2);

    // A late poll plays one tone, not a burst.
    clock.advance(12_000);
    engine.poll();
    assert_eq!(rec.borrow().tones.len(), 3);

    engine.acknowledge_alarm();
    assert!(!engine.is_ringing());
    assert!(!engine.alarm_is_looping());
    clock.advance(30_000);
    engine.poll();
    assert_eq!(rec.borrow().tones.len(), 3);
}

#[test]
fn volume_change_applies_to_next_tone() {
    let (mut engine, clock, rec, _) = setup(false);
    run_to_completion(&mut engine, &clock);
    assert_eq!(rec.borrow().tones, vec![0.5]);

    engine.set_alarm_volume(0.2).unwrap();
    clock.advance(3_000);
    engine.poll();
    assert_eq!(rec.borrow().tones, vec![0.5, 0.2]);
}

#[test]
fn muted_alarm_still_rings_silently() {
    let (mut engine, clock, rec, _) = setup(false);
    engine.set_sound_enabled(false);
    run_to_completion(&mut engine, &clock);
    assert!(engine.is_ringing());
    clock.advance(9_000);
    engine.poll();
    assert!(rec.borrow().tones.is_empty());
}

#[test]
fn acknowledge_without_alarm_is_a_no_op() {
    let (mut engine, _clock, _rec, _) = setup(false);
    assert!(engine.acknowledge_alarm().is_empty());
    assert_eq!(engine.countdown().remaining_secs(), 1500);
}

#[test]
fn background_completion_notifies_when_permitted() {
    let (mut engine, clock, rec, _) = setup(true);
    engine.adjust_time(-24).unwrap();
    engine.start_countdown();
    engine.on_suspend();
    clock.advance(60_000);
    engine.poll();

    assert!(engine.is_ringing());
    let rec = rec.borrow();
    assert_eq!(rec.notifications.len(), 1);
    assert_eq!(rec.notifications[0].0, "Time's up");
    assert_eq!(rec.notifications[0].1, "Focus complete");
}

#[test]
fn foreground_completion_does_not_notify() {
    let (mut engine, clock, rec, _) = setup(true);
    run_to_completion(&mut engine, &clock);
    assert!(rec.borrow().notifications.is_empty());
}

#[test]
fn background_completion_without_permission_stays_quiet() {
    let (mut engine, clock, rec, _) = setup(false);
    engine.adjust_time(-24).unwrap();
    engine.start_countdown();
    engine.on_suspend();
    clock.advance(60_000);
    engine.poll();
    assert!(engine.is_ringing());
    assert!(rec.borrow().notifications.is_empty());
}

#[test]
fn wake_lock_shared_between_countdown_and_stopwatch() {
    let (mut engine, clock, rec, _) = setup(false);
    engine.start_countdown();
    engine.start_stopwatch();
    assert!(engine.wake_lock_held());
    assert_eq!(rec.borrow().acquired, 1);

    engine.pause_countdown();
    assert!(engine.wake_lock_held());
    assert_eq!(rec.borrow().released, 0);

    clock.advance(1_000);
    engine.pause_stopwatch();
    assert!(!engine.wake_lock_held());
    assert_eq!(rec.borrow().released, 1);
}

#[test]
fn wake_lock_held_while_ringing() {
    let (mut engine, clock, rec, _) = setup(false);
    run_to_completion(&mut engine, &clock);
    assert!(engine.wake_lock_held());
    engine.acknowledge_alarm();
    assert!(!engine.wake_lock_held());
    assert_eq!(rec.borrow().released, 1);
}

#[test]
fn failing_capabilities_never_disturb_timing() {
    let clock = ManualClock::new(T0);
    let mut engine = SessionEngine::new(
        EngineOptions::default(),
        Box::new(MemoryStore::new()),
        Box::new(MemoryBackend::new()),
    )
    .with_clock(clock.clone())
    .with_capabilities(Capabilities {
        tone: Box::new(BrokenTone),
        wake_lock: Box::new(DeniedLock),
        ..Capabilities::default()
    });

    engine.start_countdown();
    assert!(!engine.wake_lock_held());
    clock.advance(1_500_000);
    engine.poll();
    assert!(engine.is_ringing());
    assert_eq!(engine.countdown().remaining_secs(), 0);
    engine.acknowledge_alarm();
    assert!(!engine.wake_lock_held());
}

#[test]
fn auto_save_failure_keeps_alarm_and_state() {
    let (mut engine, clock, _rec, backend) = setup(false);
    backend.set_fail_writes(true);
    let events = run_to_completion(&mut engine, &clock);

    assert!(events
        .iter()
        .any(|e| matches!(e, Event::SessionLogFailed { .. })));
    assert!(engine.is_ringing());
    assert_eq!(engine.countdown().sessions_completed(), 1);
    assert_eq!(engine.daily_progress().focus_minutes, 0);
    assert!(backend.records().is_empty());
}
