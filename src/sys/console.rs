//! Console frontend: an in-memory world of applications plus a terminal
//! rendering of the overlay. This is what the binary runs the engine against;
//! it doubles as a demonstration of what a real platform frontend has to
//! provide.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

use crate::actor;
use crate::actor::switchboard::Event;
use crate::common::collections::HashMap;
use crate::switch_engine::{
    ActivationService, AppId, CandidateFlags, CandidateInfo, OverlayFrame, PresentationSurface,
    ProcessDirectory, WindowDirectory, WindowRecord, WindowStableId,
};

const OWN_ID: u32 = 1;

pub struct World {
    apps: Vec<CandidateInfo>,
    windows: HashMap<AppId, Vec<WindowRecord>>,
    focused: HashMap<AppId, u32>,
    frontmost: Option<AppId>,
}

impl World {
    /// A small fixed population to drive the engine from a terminal.
    pub fn sample() -> Rc<RefCell<World>> {
        let names = ["Finder", "Safari", "Slack", "Terminal", "Music"];
        let apps = names
            .iter()
            .enumerate()
            .map(|(i, name)| CandidateInfo {
                id: AppId::new(i as u32 + 2),
                name: name.to_string(),
                flags: CandidateFlags::REGULAR,
            })
            .collect::<Vec<_>>();
        let mut windows: HashMap<AppId, Vec<WindowRecord>> = HashMap::default();
        for app in &apps {
            let base = u64::from(app.id.as_u32()) * 100;
            windows.insert(
                app.id,
                (0..2)
                    .map(|i| WindowRecord {
                        stable_id: WindowStableId::new(base + i),
                        window_number: (base + i) as u32,
                        title: format!("{} window {}", app.name, i + 1),
                    })
                    .collect(),
            );
        }
        let frontmost = apps.first().map(|a| a.id);
        Rc::new(RefCell::new(World { apps, windows, focused: HashMap::default(), frontmost }))
    }

    fn flag(&mut self, id: AppId, flag: CandidateFlags, set: bool) {
        if let Some(app) = self.apps.iter_mut().find(|a| a.id == id) {
            if set {
                app.flags |= flag;
            } else {
                app.flags -= flag;
            }
        }
    }

    fn is_terminated(&self, id: AppId) -> bool {
        self.apps
            .iter()
            .find(|a| a.id == id)
            .is_none_or(|a| a.flags.contains(CandidateFlags::TERMINATED))
    }
}

#[derive(Clone)]
pub struct ConsoleProcesses {
    world: Rc<RefCell<World>>,
}

impl ConsoleProcesses {
    pub fn new(world: Rc<RefCell<World>>) -> Self {
        Self { world }
    }
}

impl ProcessDirectory for ConsoleProcesses {
    fn own_id(&self) -> AppId {
        AppId::new(OWN_ID)
    }

    fn candidates(&self) -> Vec<CandidateInfo> {
        self.world.borrow().apps.iter().filter(|a| a.is_eligible()).cloned().collect()
    }

    fn frontmost(&self) -> Option<AppId> {
        self.world.borrow().frontmost
    }

    fn info(&self, id: AppId) -> Option<CandidateInfo> {
        self.world.borrow().apps.iter().find(|a| a.id == id).cloned()
    }
}

#[derive(Clone)]
pub struct ConsoleWindows {
    world: Rc<RefCell<World>>,
}

impl ConsoleWindows {
    pub fn new(world: Rc<RefCell<World>>) -> Self {
        Self { world }
    }
}

impl WindowDirectory for ConsoleWindows {
    fn windows(&self, app: AppId) -> Vec<WindowRecord> {
        self.world.borrow().windows.get(&app).cloned().unwrap_or_default()
    }

    fn focused_window_number(&self, app: AppId) -> Option<u32> {
        self.world.borrow().focused.get(&app).copied()
    }

    fn raise_window(&mut self, app: AppId, window: WindowStableId) -> bool {
        let mut world = self.world.borrow_mut();
        let Some(record) = world
            .windows
            .get(&app)
            .and_then(|list| list.iter().find(|w| w.stable_id == window))
            .cloned()
        else {
            return false;
        };
        world.focused.insert(app, record.window_number);
        println!("[raise] {}", record.title);
        true
    }
}

/// Renders the overlay as a block of lines on stdout.
#[derive(Default)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    fn render(&self, frame: &OverlayFrame) {
        println!("+-- switch [{}]", frame.search);
        for (i, row) in frame.rows.iter().enumerate() {
            let cursor = if frame.selected == Some(i) { ">" } else { " " };
            if frame.show_badges && i < 10 {
                println!("| {cursor} [{}] {}", (i + 1) % 10, row.name);
            } else {
                println!("| {cursor}     {}", row.name);
            }
        }
        if frame.rows.is_empty() {
            println!("|   (no matches)");
        }
        println!("+--");
    }
}

impl PresentationSurface for ConsoleSurface {
    fn show(&mut self, frame: &OverlayFrame) {
        self.render(frame);
    }

    fn update(&mut self, frame: &OverlayFrame) {
        self.render(frame);
    }

    fn hide(&mut self) {
        println!("+-- overlay closed");
    }

    fn show_toast(&mut self, text: &str) {
        println!("[toast] {text}");
    }

    fn hide_toast(&mut self) {
        println!("[toast cleared]");
    }
}

/// Applies activation requests to the world and reports the resulting
/// activations back as engine events, the way a platform notification
/// observer would.
pub struct ConsoleActivation {
    world: Rc<RefCell<World>>,
    events_tx: actor::Sender<Event>,
}

impl ConsoleActivation {
    pub fn new(world: Rc<RefCell<World>>, events_tx: actor::Sender<Event>) -> Self {
        Self { world, events_tx }
    }

    fn bring_to_front(&mut self, id: AppId) -> bool {
        let mut world = self.world.borrow_mut();
        if world.is_terminated(id) {
            return false;
        }
        world.frontmost = Some(id);
        let name = world.apps.iter().find(|a| a.id == id).map(|a| a.name.clone());
        drop(world);
        info!(?id, ?name, "activated");
        println!("[activate] {}", name.unwrap_or_default());
        self.events_tx.send(Event::AppActivated(id));
        true
    }
}

impl ActivationService for ConsoleActivation {
    fn activate(&mut self, id: AppId) -> bool {
        self.bring_to_front(id)
    }

    fn activate_all_windows(&mut self, id: AppId) -> bool {
        self.bring_to_front(id)
    }

    fn relaunch(&mut self, id: AppId) -> bool {
        self.world.borrow_mut().flag(id, CandidateFlags::TERMINATED, false);
        self.bring_to_front(id)
    }

    fn unhide_and_raise(&mut self, id: AppId) -> bool {
        self.world.borrow_mut().flag(id, CandidateFlags::HIDDEN, false);
        self.bring_to_front(id)
    }

    fn terminate(&mut self, id: AppId) -> bool {
        let mut world = self.world.borrow_mut();
        if world.is_terminated(id) {
            return false;
        }
        world.flag(id, CandidateFlags::TERMINATED, true);
        if world.frontmost == Some(id) {
            world.frontmost = None;
        }
        drop(world);
        self.events_tx.send(Event::AppTerminated(id));
        true
    }
}
