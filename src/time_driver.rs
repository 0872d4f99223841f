//! embassy-time driver for the std build.
//!
//! The std build of embassy-time supplies no time driver, so this module
//! registers one: a fixed 1:1 mapping from the host monotonic clock to
//! embassy ticks, with a BTreeMap wake queue drained by a dedicated
//! scheduler thread.

use core::task::Waker;
use embassy_time_driver::{Driver, TICK_HZ, time_driver_impl};
use std::collections::BTreeMap;
use std::sync::{Condvar, Mutex, OnceLock};
use std::time::{Duration, Instant as StdInstant};

#[derive(Default)]
struct WakeQueue {
    // Map of tick-timestamp -> wakers due at that time
    queue: BTreeMap<u64, Vec<Waker>>,
}

// Global singletons initialized lazily at first use
static ORIGIN: OnceLock<StdInstant> = OnceLock::new();
static QUEUE: OnceLock<Mutex<WakeQueue>> = OnceLock::new();
static CV: OnceLock<Condvar> = OnceLock::new();
static SCHEDULER_STARTED: OnceLock<()> = OnceLock::new();

fn origin() -> StdInstant {
    *ORIGIN.get_or_init(StdInstant::now)
}

fn queue() -> &'static Mutex<WakeQueue> {
    QUEUE.get_or_init(|| Mutex::new(WakeQueue::default()))
}

fn cv() -> &'static Condvar {
    CV.get_or_init(Condvar::new)
}

fn ticks_since_origin(r: StdInstant) -> u64 {
    let dt = r.saturating_duration_since(origin());
    (dt.as_nanos() as u128 * TICK_HZ as u128 / 1_000_000_000u128) as u64
}

fn instant_for_ticks(ticks: u64) -> StdInstant {
    let ns = (ticks as u128) * 1_000_000_000u128 / (TICK_HZ as u128);
    // Clamp to avoid u128 -> u64 truncation on very long durations
    origin() + Duration::from_nanos(ns.min(u64::MAX as u128) as u64)
}

fn ensure_scheduler_thread() {
    SCHEDULER_STARTED.get_or_init(|| {
        std::thread::Builder::new()
            .name("embassy-time-scheduler".into())
            .spawn(scheduler_thread)
            .expect("failed to start embassy-time scheduler thread");
    });
}

fn scheduler_thread() {
    loop {
        // Snapshot the earliest deadline, or wait for new items
        let next_at = loop {
            let guard = queue().lock().unwrap();
            if guard.queue.is_empty() {
                let guard = cv().wait(guard).unwrap();
                drop(guard);
                continue;
            }
            let (&next_at, _) = guard.queue.iter().next().unwrap();
            break next_at;
        };

        let real_target = instant_for_ticks(next_at);
        let now_r = StdInstant::now();

        if real_target > now_r {
            let guard = queue().lock().unwrap();
            // A new earlier deadline arriving notifies the condvar; iterate again either way
            let (guard, _timeout_res) = cv().wait_timeout(guard, real_target - now_r).unwrap();
            drop(guard);
            continue;
        }

        // Drain all due wakers, then wake outside the lock
        let now_ticks = ticks_since_origin(StdInstant::now());
        let mut ready: Vec<Waker> = Vec::new();
        {
            let mut guard = queue().lock().unwrap();
            let mut due = Vec::new();
            for (&ts, ws) in guard.queue.iter() {
                if ts <= now_ticks {
                    ready.extend(ws.iter().cloned());
                    due.push(ts);
                } else {
                    break;
                }
            }
            for ts in due {
                guard.queue.remove(&ts);
            }
        }

        for w in ready.into_iter() {
            w.wake();
        }
    }
}

struct StdDriver;

impl Driver for StdDriver {
    fn now(&self) -> u64 {
        ticks_since_origin(StdInstant::now())
    }

    fn schedule_wake(&self, at: u64, waker: &Waker) {
        ensure_scheduler_thread();
        let mut guard = queue().lock().unwrap();
        guard.queue.entry(at).or_default().push(waker.clone());
        drop(guard);
        cv().notify_all();
    }
}

// Register as the global time driver for embassy-time
time_driver_impl!(static DRIVER: StdDriver = StdDriver);
