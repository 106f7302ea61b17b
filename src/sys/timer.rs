//! One-shot timers and the clock seam.
//!
//! The engine owns at most one live timer per kind. Scheduling always cancels
//! the previous instance of that kind first, and every scheduled firing
//! carries a token so a firing that raced with its own cancellation can be
//! recognized as stale and dropped.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::actor;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerKind {
    LongPress,
    ToastHide,
}

impl TimerKind {
    fn slot(self) -> usize {
        match self {
            TimerKind::LongPress => 0,
            TimerKind::ToastHide => 1,
        }
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub trait TimerHost {
    /// Cancels any live timer of `kind` and schedules a new one. Returns the
    /// token the firing will carry.
    fn schedule(&mut self, kind: TimerKind, after: Duration) -> u64;

    fn cancel(&mut self, kind: TimerKind);
}

/// Timer host backed by tokio tasks on the current-thread runtime. Firings
/// are delivered as ordinary events on the engine's channel, which keeps all
/// state mutation on the single processing loop.
pub struct TokioTimers<E: 'static> {
    tx: actor::Sender<E>,
    make_event: fn(TimerKind, u64) -> E,
    next_token: u64,
    tasks: [Option<JoinHandle<()>>; 2],
}

impl<E: 'static> TokioTimers<E> {
    pub fn new(tx: actor::Sender<E>, make_event: fn(TimerKind, u64) -> E) -> Self {
        Self {
            tx,
            make_event,
            next_token: 1,
            tasks: [None, None],
        }
    }
}

impl<E: 'static> TimerHost for TokioTimers<E> {
    fn schedule(&mut self, kind: TimerKind, after: Duration) -> u64 {
        self.cancel(kind);
        let token = self.next_token;
        self.next_token += 1;
        let tx = self.tx.clone();
        let make_event = self.make_event;
        self.tasks[kind.slot()] = Some(tokio::task::spawn_local(async move {
            tokio::time::sleep(after).await;
            tx.send(make_event(kind, token));
        }));
        token
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(task) = self.tasks[kind.slot()].take() {
            task.abort();
        }
    }
}

impl<E: 'static> Drop for TokioTimers<E> {
    fn drop(&mut self) {
        self.cancel(TimerKind::LongPress);
        self.cancel(TimerKind::ToastHide);
    }
}
