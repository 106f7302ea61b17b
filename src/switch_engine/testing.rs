//! Fake collaborators for engine tests. Each fake hands out cloneable
//! handles over shared interior state so a test can keep inspecting and
//! mutating the world after the boxed trait object moved into the engine.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::common::collections::HashSet;
use crate::sys::timer::{Clock, TimerHost, TimerKind};

use super::{
    ActivationService, AppId, CandidateFlags, CandidateInfo, OverlayFrame, PresentationSurface,
    ProcessDirectory, WindowDirectory, WindowRecord, WindowStableId,
};

const OWN_ID: u32 = 9999;

#[derive(Clone)]
pub struct FakeProcesses {
    inner: Rc<RefCell<ProcessesInner>>,
}

struct ProcessesInner {
    frontmost: Option<AppId>,
    apps: Vec<CandidateInfo>,
}

impl FakeProcesses {
    pub fn new(names: &[&str]) -> Self {
        let apps = names
            .iter()
            .enumerate()
            .map(|(i, name)| CandidateInfo {
                id: AppId::new(i as u32 + 1),
                name: name.to_string(),
                flags: CandidateFlags::REGULAR,
            })
            .collect();
        Self {
            inner: Rc::new(RefCell::new(ProcessesInner { frontmost: None, apps })),
        }
    }

    pub fn id_of(&self, name: &str) -> AppId {
        self.inner
            .borrow()
            .apps
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("no fake app named {name}"))
            .id
    }

    pub fn set_frontmost(&self, id: Option<AppId>) {
        self.inner.borrow_mut().frontmost = id;
    }

    pub fn hide(&self, id: AppId) {
        self.set_flag(id, CandidateFlags::HIDDEN);
    }

    pub fn terminate(&self, id: AppId) {
        self.set_flag(id, CandidateFlags::TERMINATED);
    }

    fn set_flag(&self, id: AppId, flag: CandidateFlags) {
        let mut inner = self.inner.borrow_mut();
        if let Some(app) = inner.apps.iter_mut().find(|a| a.id == id) {
            app.flags |= flag;
        }
    }
}

impl ProcessDirectory for FakeProcesses {
    fn own_id(&self) -> AppId {
        AppId::new(OWN_ID)
    }

    fn candidates(&self) -> Vec<CandidateInfo> {
        self.inner.borrow().apps.iter().filter(|a| a.is_eligible()).cloned().collect()
    }

    fn frontmost(&self) -> Option<AppId> {
        self.inner.borrow().frontmost
    }

    fn info(&self, id: AppId) -> Option<CandidateInfo> {
        self.inner.borrow().apps.iter().find(|a| a.id == id).cloned()
    }
}

#[derive(Clone, Default)]
pub struct FakeWindows {
    inner: Rc<RefCell<WindowsInner>>,
}

#[derive(Default)]
struct WindowsInner {
    windows: Vec<(AppId, Vec<WindowRecord>)>,
    focused: Vec<(AppId, u32)>,
    raised: Vec<(AppId, WindowStableId)>,
    refuse_raises: bool,
}

impl FakeWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_windows(&self, app: AppId, windows: Vec<WindowRecord>) {
        let mut inner = self.inner.borrow_mut();
        inner.windows.retain(|(a, _)| *a != app);
        inner.windows.push((app, windows));
    }

    pub fn set_focused(&self, app: AppId, number: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.focused.retain(|(a, _)| *a != app);
        inner.focused.push((app, number));
    }

    pub fn raised(&self) -> Vec<(AppId, WindowStableId)> {
        self.inner.borrow().raised.clone()
    }

    pub fn refuse_raises(&self) {
        self.inner.borrow_mut().refuse_raises = true;
    }
}

impl WindowDirectory for FakeWindows {
    fn windows(&self, app: AppId) -> Vec<WindowRecord> {
        self.inner
            .borrow()
            .windows
            .iter()
            .find(|(a, _)| *a == app)
            .map(|(_, w)| w.clone())
            .unwrap_or_default()
    }

    fn focused_window_number(&self, app: AppId) -> Option<u32> {
        self.inner.borrow().focused.iter().find(|(a, _)| *a == app).map(|(_, n)| *n)
    }

    fn raise_window(&mut self, app: AppId, window: WindowStableId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.refuse_raises {
            return false;
        }
        inner.raised.push((app, window));
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Show(OverlayFrame),
    Update(OverlayFrame),
    Hide,
    Toast(String),
    HideToast,
}

#[derive(Clone, Default)]
pub struct FakeSurface {
    calls: Rc<RefCell<Vec<SurfaceCall>>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    pub fn last_frame(&self) -> Option<OverlayFrame> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            SurfaceCall::Show(f) | SurfaceCall::Update(f) => Some(f.clone()),
            _ => None,
        })
    }

    pub fn visible(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|c| match c {
                SurfaceCall::Show(_) | SurfaceCall::Update(_) => Some(true),
                SurfaceCall::Hide => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl PresentationSurface for FakeSurface {
    fn show(&mut self, frame: &OverlayFrame) {
        self.calls.borrow_mut().push(SurfaceCall::Show(frame.clone()));
    }

    fn update(&mut self, frame: &OverlayFrame) {
        self.calls.borrow_mut().push(SurfaceCall::Update(frame.clone()));
    }

    fn hide(&mut self) {
        self.calls.borrow_mut().push(SurfaceCall::Hide);
    }

    fn show_toast(&mut self, text: &str) {
        self.calls.borrow_mut().push(SurfaceCall::Toast(text.to_string()));
    }

    fn hide_toast(&mut self) {
        self.calls.borrow_mut().push(SurfaceCall::HideToast);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActCall {
    ActivateAllWindows(AppId),
    Activate(AppId),
    Relaunch(AppId),
    UnhideAndRaise(AppId),
    Terminate(AppId),
}

#[derive(Clone, Default)]
pub struct FakeActivation {
    inner: Rc<RefCell<ActivationInner>>,
}

#[derive(Default)]
struct ActivationInner {
    calls: Vec<ActCall>,
    refuse_all_windows: HashSet<AppId>,
    refuse_plain: HashSet<AppId>,
    refuse_terminate: HashSet<AppId>,
}

impl FakeActivation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ActCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn activated(&self) -> Vec<AppId> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                ActCall::ActivateAllWindows(id) | ActCall::Activate(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn refuse_all_windows(&self, id: AppId) {
        self.inner.borrow_mut().refuse_all_windows.insert(id);
    }

    pub fn refuse_plain(&self, id: AppId) {
        self.inner.borrow_mut().refuse_plain.insert(id);
    }

    pub fn refuse_terminate(&self, id: AppId) {
        self.inner.borrow_mut().refuse_terminate.insert(id);
    }
}

impl ActivationService for FakeActivation {
    fn activate(&mut self, id: AppId) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ActCall::Activate(id));
        !inner.refuse_plain.contains(&id)
    }

    fn activate_all_windows(&mut self, id: AppId) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ActCall::ActivateAllWindows(id));
        !inner.refuse_all_windows.contains(&id)
    }

    fn relaunch(&mut self, id: AppId) -> bool {
        self.inner.borrow_mut().calls.push(ActCall::Relaunch(id));
        false
    }

    fn unhide_and_raise(&mut self, id: AppId) -> bool {
        self.inner.borrow_mut().calls.push(ActCall::UnhideAndRaise(id));
        true
    }

    fn terminate(&mut self, id: AppId) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ActCall::Terminate(id));
        !inner.refuse_terminate.contains(&id)
    }
}

/// Timer host that records schedules instead of arming anything. Tests fire
/// timers by feeding the returned token back as a `TimerFired` event.
#[derive(Clone, Default)]
pub struct FakeTimers {
    inner: Rc<RefCell<TimersInner>>,
}

#[derive(Default)]
struct TimersInner {
    next_token: u64,
    pending: Vec<(TimerKind, Duration, u64)>,
}

impl FakeTimers {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimersInner { next_token: 1, pending: Vec::new() })),
        }
    }

    pub fn pending(&self, kind: TimerKind) -> Option<(Duration, u64)> {
        self.inner
            .borrow()
            .pending
            .iter()
            .find(|(k, ..)| *k == kind)
            .map(|(_, after, token)| (*after, *token))
    }

    /// Removes and returns the pending timer of `kind`, as a firing would.
    pub fn take(&self, kind: TimerKind) -> Option<u64> {
        let mut inner = self.inner.borrow_mut();
        let pos = inner.pending.iter().position(|(k, ..)| *k == kind)?;
        let (_, _, token) = inner.pending.remove(pos);
        Some(token)
    }
}

impl TimerHost for FakeTimers {
    fn schedule(&mut self, kind: TimerKind, after: Duration) -> u64 {
        let mut inner = self.inner.borrow_mut();
        inner.pending.retain(|(k, ..)| *k != kind);
        let token = inner.next_token;
        inner.next_token += 1;
        inner.pending.push((kind, after, token));
        token
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.inner.borrow_mut().pending.retain(|(k, ..)| *k != kind);
    }
}

#[derive(Clone)]
pub struct FakeClock {
    now: Rc<Cell<Instant>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { now: Rc::new(Cell::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
