//! The switchboard actor: owns every piece of engine state and is the only
//! place that state is mutated. Frontends, timers, and the config watcher
//! talk to it exclusively through events on its channel; it talks back to the
//! world through the collaborator traits it was constructed with.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::actor::Receiver;
use crate::actor::replay::Record;
use crate::common::config::{Action, Config};
use crate::switch_engine::overlay::{EscapeOutcome, OverlayEntry};
use crate::switch_engine::press::{HoldAction, ReleaseAction};
use crate::switch_engine::{
    ActivationService, AppId, FilterOutcome, MruTracker, OverlaySession, PresentationSurface,
    PressArbiter, ProcessDirectory, WindowCycler, WindowDirectory,
};
use crate::sys::timer::{Clock, TimerHost, TimerKind};

/// How long a quit confirmation toast stays up.
pub const TOAST_HIDE_AFTER: std::time::Duration = std::time::Duration::from_millis(1500);

/// Keyboard input forwarded while the overlay is up. The frontend owns the
/// raw-event-to-input translation; digits arrive as `Digit` so the engine can
/// decide between row selection and search.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum OverlayInput {
    Char(char),
    Digit(char),
    Backspace,
    Escape,
    Next,
    Prev,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Event {
    HotkeyPressed(Action),
    HotkeyReleased(Action),
    OverlayInput(OverlayInput),
    /// Pointer click on an overlay row.
    OverlayClicked(AppId),
    /// The OS brought this app to the front (for any reason, not only ours).
    AppActivated(AppId),
    AppTerminated(AppId),
    TimerFired {
        kind: TimerKind,
        token: u64,
    },
    ConfigUpdated(Box<Config>),
    Shutdown,
}

/// Everything the switchboard needs from the outside world.
pub struct Collaborators {
    pub processes: Box<dyn ProcessDirectory>,
    pub windows: Box<dyn WindowDirectory>,
    pub surface: Box<dyn PresentationSurface>,
    pub activation: Box<dyn ActivationService>,
    pub timers: Box<dyn TimerHost>,
    pub clock: Box<dyn Clock>,
}

pub struct Switchboard {
    config: Config,
    record: Record,
    arbiter: PressArbiter,
    mru: MruTracker,
    session: Option<OverlaySession>,
    cycler: WindowCycler,
    toast_token: u64,
    processes: Box<dyn ProcessDirectory>,
    windows: Box<dyn WindowDirectory>,
    surface: Box<dyn PresentationSurface>,
    activation: Box<dyn ActivationService>,
    timers: Box<dyn TimerHost>,
    clock: Box<dyn Clock>,
}

impl Switchboard {
    pub fn new(config: Config, deps: Collaborators, mut record: Record) -> Self {
        record.start(&config);
        let mut mru = MruTracker::new();
        mru.seed(&*deps.processes);
        let arbiter = PressArbiter::new(config.settings.hold_threshold());
        Self {
            config,
            record,
            arbiter,
            mru,
            session: None,
            cycler: WindowCycler::new(),
            toast_token: 0,
            processes: deps.processes,
            windows: deps.windows,
            surface: deps.surface,
            activation: deps.activation,
            timers: deps.timers,
            clock: deps.clock,
        }
    }

    pub async fn run(mut self, mut events: Receiver<Event>) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            if !self.handle_event(event) {
                break;
            }
        }
        info!("switchboard stopped");
    }

    /// Processes one event. Returns `false` when the actor should stop.
    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: Event) -> bool {
        self.record.on_event(&event);
        match event {
            Event::HotkeyPressed(Action::AppSwitch) => self.on_switch_pressed(),
            Event::HotkeyReleased(Action::AppSwitch) => self.on_switch_released(),
            Event::HotkeyPressed(Action::CycleWindows) => self.on_cycle_windows(),
            Event::HotkeyPressed(Action::OverlaySelect) => self.on_overlay_select(),
            Event::HotkeyPressed(Action::OverlayQuit) => self.on_overlay_quit(),
            Event::HotkeyReleased(_) => {}
            Event::OverlayInput(input) => self.on_overlay_input(input),
            Event::OverlayClicked(id) => self.on_overlay_clicked(id),
            Event::AppActivated(id) => self.mru.record_activation(id, &*self.processes),
            Event::AppTerminated(id) => self.on_app_terminated(id),
            Event::TimerFired { kind, token } => self.on_timer_fired(kind, token),
            Event::ConfigUpdated(config) => self.on_config_updated(*config),
            Event::Shutdown => {
                self.timers.cancel(TimerKind::LongPress);
                self.timers.cancel(TimerKind::ToastHide);
                if self.session.take().is_some() {
                    self.surface.hide();
                }
                return false;
            }
        }
        true
    }

    fn on_switch_pressed(&mut self) {
        if self.arbiter.session_active() {
            warn!("switch press while a session is active; ignoring");
            return;
        }
        let token = self
            .timers
            .schedule(TimerKind::LongPress, self.arbiter.threshold());
        let now = self.clock.now();
        self.arbiter.begin(now, self.session.is_some(), token);
    }

    fn on_switch_released(&mut self) {
        self.timers.cancel(TimerKind::LongPress);
        match self.arbiter.on_released(self.clock.now()) {
            ReleaseAction::None => {}
            ReleaseAction::QuickSwitch => self.quick_switch(),
            ReleaseAction::AdvanceSelection => {
                if let Some(session) = &mut self.session {
                    session.move_selection(1);
                    self.update_overlay();
                }
            }
        }
    }

    fn on_timer_fired(&mut self, kind: TimerKind, token: u64) {
        match kind {
            TimerKind::LongPress => match self.arbiter.on_timer(token) {
                Some(HoldAction::OpenOverlay) => self.open_overlay(),
                Some(HoldAction::CancelOverlay) => self.cancel_overlay(),
                None => {}
            },
            TimerKind::ToastHide => {
                if token != self.toast_token {
                    debug!(token, "stale toast-hide firing; dropping");
                    return;
                }
                self.surface.hide_toast();
            }
        }
    }

    /// Tap with the overlay closed: jump straight to the second entry of the
    /// MRU list (the one before the current app), or the first when the list
    /// has a single entry.
    fn quick_switch(&mut self) {
        self.mru.prune(&*self.processes);
        let snapshot = self.mru.snapshot();
        let Some(&target) = snapshot.get(1).or_else(|| snapshot.first()) else {
            debug!("quick switch with empty MRU list; nothing to do");
            return;
        };
        if self.session.take().is_some() {
            self.surface.hide();
        }
        self.activate_app(target);
    }

    fn open_overlay(&mut self) {
        if self.session.is_some() {
            return;
        }
        self.mru.prune(&*self.processes);
        let entries: Vec<OverlayEntry> = self
            .mru
            .snapshot()
            .into_iter()
            .filter_map(|id| {
                self.processes
                    .name(id)
                    .map(|name| OverlayEntry { id, name })
            })
            .collect();
        let origin = self.processes.frontmost();
        match OverlaySession::open(entries, origin, self.config.settings.auto_select_single) {
            Some(session) => {
                let frame = session.frame(self.config.settings.show_number_badges);
                self.session = Some(session);
                self.surface.show(&frame);
                debug!("overlay opened");
            }
            None => debug!("overlay not opened; no switchable candidates"),
        }
    }

    /// Hold while the overlay is up: tear it down and go back to the app
    /// that was frontmost when the overlay opened.
    fn cancel_overlay(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.surface.hide();
        if let Some(origin) = session.origin() {
            self.activate_app(origin);
        }
    }

    fn on_overlay_select(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match session.selected_id() {
            Some(id) => self.activate_and_close(id),
            None => trace!("select with no highlighted row"),
        }
    }

    fn on_overlay_quit(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        let Some(removed) = session.quit_highlighted() else {
            return;
        };
        // The removal is optimistic: the entry leaves the overlay and the
        // MRU list even when the app refuses to terminate.
        if !self.activation.terminate(removed.id) {
            warn!(id = ?removed.id, name = %removed.name, "terminate request refused");
        }
        self.mru.remove(removed.id);
        self.mru.prune(&*self.processes);
        self.update_overlay();
        self.surface.show_toast(&format!("Quit {}", removed.name));
        self.toast_token = self.timers.schedule(TimerKind::ToastHide, TOAST_HIDE_AFTER);
    }

    fn on_overlay_input(&mut self, input: OverlayInput) {
        let Some(session) = &mut self.session else {
            trace!(?input, "overlay input with no session; ignoring");
            return;
        };
        match input {
            OverlayInput::Char(c) => {
                let outcome = session.type_char(c);
                self.apply_filter_outcome(outcome);
            }
            OverlayInput::Digit(c) => {
                if self.config.settings.show_number_badges {
                    match session.select_by_digit(c) {
                        Some(id) => self.activate_and_close(id),
                        None => trace!(digit = %c, "no row for digit"),
                    }
                } else {
                    let outcome = session.type_char(c);
                    self.apply_filter_outcome(outcome);
                }
            }
            OverlayInput::Backspace => {
                let outcome = session.backspace();
                self.apply_filter_outcome(outcome);
            }
            OverlayInput::Escape => match session.escape_or_clear() {
                (EscapeOutcome::Cancel { .. }, _) => self.cancel_overlay(),
                (EscapeOutcome::Cleared, Some(outcome)) => self.apply_filter_outcome(outcome),
                (EscapeOutcome::Cleared, None) => {}
            },
            OverlayInput::Next => {
                session.move_selection(1);
                self.update_overlay();
            }
            OverlayInput::Prev => {
                session.move_selection(-1);
                self.update_overlay();
            }
        }
    }

    fn on_overlay_clicked(&mut self, id: AppId) {
        if self.session.is_none() {
            trace!(?id, "overlay click with no session; ignoring");
            return;
        }
        self.activate_and_close(id);
    }

    fn apply_filter_outcome(&mut self, outcome: FilterOutcome) {
        match outcome {
            FilterOutcome::Render => self.update_overlay(),
            FilterOutcome::AutoSelected(id) => {
                debug!(?id, "auto-selecting single match");
                self.activate_and_close(id);
            }
        }
    }

    /// Explicit or automatic selection: close the overlay and activate the
    /// choice. The origin app is deliberately not touched.
    fn activate_and_close(&mut self, id: AppId) {
        if self.session.take().is_some() {
            self.surface.hide();
        }
        self.activate_app(id);
    }

    /// Activation strategy chain, strongest first. A refusal falls through
    /// to the next strategy; total failure is logged and otherwise absorbed.
    fn activate_app(&mut self, id: AppId) {
        if self.activation.activate_all_windows(id) {
            return;
        }
        if self.activation.activate(id) {
            return;
        }
        if self.activation.relaunch(id) {
            return;
        }
        if self.activation.unhide_and_raise(id) {
            return;
        }
        warn!(?id, "every activation strategy failed");
    }

    fn on_cycle_windows(&mut self) {
        let Some(app) = self.processes.frontmost() else {
            debug!("cycle windows with no frontmost app");
            return;
        };
        let windows = self.windows.windows(app);
        let focused = self.windows.focused_window_number(app);
        let Some(next) = self.cycler.next_window(app, &windows, focused) else {
            debug!(?app, "no windows to cycle");
            return;
        };
        if !self.windows.raise_window(app, windows[next].stable_id) {
            warn!(?app, index = next, "raise request refused");
        }
    }

    fn on_app_terminated(&mut self, id: AppId) {
        self.mru.remove(id);
        self.mru.prune(&*self.processes);
        if let Some(session) = &mut self.session {
            session.remove_candidate(id);
            self.update_overlay();
        }
    }

    fn on_config_updated(&mut self, config: Config) {
        info!("applying updated configuration");
        let threshold = config.settings.hold_threshold();
        if self.arbiter.set_threshold(threshold) {
            // Mid-press change: the timer restarts for the full new duration
            // measured from now.
            self.timers.cancel(TimerKind::LongPress);
            let token = self.timers.schedule(TimerKind::LongPress, threshold);
            self.arbiter.replace_timer_token(token);
        }
        let badges_changed =
            config.settings.show_number_badges != self.config.settings.show_number_badges;
        self.config = config;
        if let Some(session) = &mut self.session {
            session.set_auto_select_single(self.config.settings.auto_select_single);
            if badges_changed {
                self.update_overlay();
            }
        }
    }

    fn update_overlay(&mut self) {
        if let Some(session) = &self.session {
            let frame = session.frame(self.config.settings.show_number_badges);
            self.surface.update(&frame);
        }
    }
}
