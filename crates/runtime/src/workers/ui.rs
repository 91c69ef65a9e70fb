//! UI worker that owns the authoritative [`WindowSystem`].
//!
//! Receives commands from [`crate::UiHandle`], spawns one task per window load
//! plus a delay timer, feeds their results back into the window system, and
//! publishes every emitted event to the [`EventBus`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ui_core::{
    CloseOutcome, ControllerInfo, ControllerKey, InstanceId, LoadError, LoadProgress,
    LoadRequest, LoadTicket, OpenOutcome, OpenResolution, RawWindow, UiCategory, WaiterId,
    WindowId, WindowKind, WindowOptions, WindowSystem,
};

use crate::api::{Result, WindowLoader};
use crate::events::EventBus;

pub type ControllerFilter = Box<dyn Fn(&ControllerInfo) -> bool + Send>;

/// Commands that can be sent to the UI worker
pub enum Command {
    /// Open (or join the in-flight open of) a root controller.
    Open {
        kind: WindowKind,
        instance: InstanceId,
        options: WindowOptions,
        reply: oneshot::Sender<Result<ControllerInfo>>,
    },
    Close {
        key: ControllerKey,
        reply: oneshot::Sender<CloseOutcome>,
    },
    CloseCategory {
        category: UiCategory,
        reply: oneshot::Sender<Vec<(ControllerKey, CloseOutcome)>>,
    },
    CloseAll {
        reply: oneshot::Sender<Vec<(ControllerKey, CloseOutcome)>>,
    },
    Show {
        key: ControllerKey,
        reply: oneshot::Sender<Result<()>>,
    },
    Hide {
        key: ControllerKey,
        reply: oneshot::Sender<Result<()>>,
    },
    Get {
        key: ControllerKey,
        reply: oneshot::Sender<Option<ControllerInfo>>,
    },
    Find {
        filter: ControllerFilter,
        reply: oneshot::Sender<Option<ControllerInfo>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<ControllerInfo>>,
    },
    Status {
        reply: oneshot::Sender<UiStatus>,
    },
    BeginSceneChange {
        reply: oneshot::Sender<Vec<(ControllerKey, CloseOutcome)>>,
    },
    CompleteSceneChange {
        reply: oneshot::Sender<()>,
    },
    OpenStandalone {
        window: RawWindow,
        sorting_order: i32,
        reply: oneshot::Sender<WindowId>,
    },
    ShowFullScreenWindow {
        window: WindowId,
        reply: oneshot::Sender<Result<()>>,
    },
    OccludeWindow {
        window: WindowId,
        reply: oneshot::Sender<Result<()>>,
    },
    CloseStandalone {
        window: WindowId,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Aggregate state of the window system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UiStatus {
    pub open_controllers: usize,
    pub loads_in_flight: usize,
    pub next_band: i32,
    pub max_sorting_order: i32,
    pub full_screen_open: bool,
    pub active_full_screen: Option<ControllerKey>,
    pub culling: bool,
    pub paused: bool,
}

/// Reports from spawned load and timer tasks.
#[derive(Debug)]
enum LoadEvent {
    Finished {
        ticket: LoadTicket,
        result: std::result::Result<RawWindow, LoadError>,
    },
    Delayed {
        ticket: LoadTicket,
        elapsed: Duration,
    },
}

/// Background task that processes UI commands.
///
/// The window system itself never awaits; every load runs on its own task
/// and reports back through an internal channel, so commands keep flowing
/// while windows are loading.
pub struct UiWorker {
    system: WindowSystem,
    loader: Arc<dyn WindowLoader>,
    command_rx: mpsc::Receiver<Command>,
    load_tx: mpsc::UnboundedSender<LoadEvent>,
    load_rx: mpsc::UnboundedReceiver<LoadEvent>,
    event_bus: EventBus,
    waiters: HashMap<WaiterId, oneshot::Sender<Result<ControllerInfo>>>,
    next_waiter: u64,
    delay_timers: HashMap<LoadTicket, JoinHandle<()>>,
    load_delay_timeout: Duration,
}

impl UiWorker {
    pub fn new(
        system: WindowSystem,
        loader: Arc<dyn WindowLoader>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        load_delay_timeout: Duration,
    ) -> Self {
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        tracing::info!(
            target: "ui::worker",
            kinds = system.catalog().len(),
            delay_timeout_ms = load_delay_timeout.as_millis() as u64,
            "ui worker initialized"
        );

        Self {
            system,
            loader,
            command_rx,
            load_tx,
            load_rx,
            event_bus,
            waiters: HashMap::new(),
            next_waiter: 0,
            delay_timers: HashMap::new(),
            load_delay_timeout,
        }
    }

    /// Main worker loop. Ends when every handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(event) = self.load_rx.recv() => self.handle_load_event(event),
            }
            self.flush_events();
        }

        for (_, timer) in self.delay_timers.drain() {
            timer.abort();
        }
        debug!(
            target: "ui::worker",
            pending_waiters = self.waiters.len(),
            "ui worker stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Open {
                kind,
                instance,
                options,
                reply,
            } => self.handle_open(kind, instance, options, reply),
            Command::Close { key, reply } => {
                respond(reply, self.system.close(&key), "Close");
            }
            Command::CloseCategory { category, reply } => {
                respond(reply, self.system.close_by_category(category), "CloseCategory");
            }
            Command::CloseAll { reply } => {
                respond(reply, self.system.close_all(), "CloseAll");
            }
            Command::Show { key, reply } => {
                respond(reply, self.system.show(&key).map_err(Into::into), "Show");
            }
            Command::Hide { key, reply } => {
                respond(reply, self.system.hide(&key).map_err(Into::into), "Hide");
            }
            Command::Get { key, reply } => {
                respond(reply, self.system.get(&key), "Get");
            }
            Command::Find { filter, reply } => {
                respond(reply, self.system.find(filter), "Find");
            }
            Command::Snapshot { reply } => {
                respond(reply, self.system.controllers(), "Snapshot");
            }
            Command::Status { reply } => {
                respond(reply, self.status(), "Status");
            }
            Command::BeginSceneChange { reply } => {
                respond(reply, self.system.begin_scene_change(), "BeginSceneChange");
            }
            Command::CompleteSceneChange { reply } => {
                self.system.complete_scene_change();
                respond(reply, (), "CompleteSceneChange");
            }
            Command::OpenStandalone {
                window,
                sorting_order,
                reply,
            } => {
                let id = self.system.open_standalone(window, sorting_order);
                respond(reply, id, "OpenStandalone");
            }
            Command::ShowFullScreenWindow { window, reply } => {
                let result = self.system.show_full_screen_window(window);
                respond(reply, result.map_err(Into::into), "ShowFullScreenWindow");
            }
            Command::OccludeWindow { window, reply } => {
                let result = self.system.occlude_window(window);
                respond(reply, result.map_err(Into::into), "OccludeWindow");
            }
            Command::CloseStandalone { window, reply } => {
                let result = self.system.close_standalone(window);
                respond(reply, result.map_err(Into::into), "CloseStandalone");
            }
        }
    }

    fn handle_open(
        &mut self,
        kind: WindowKind,
        instance: InstanceId,
        options: WindowOptions,
        reply: oneshot::Sender<Result<ControllerInfo>>,
    ) {
        self.next_waiter += 1;
        let waiter = WaiterId(self.next_waiter);

        match self.system.request_open(kind, instance, options, waiter) {
            Ok(OpenOutcome::Ready(info)) => respond(reply, Ok(info), "Open"),
            Ok(OpenOutcome::Queued) => {
                self.waiters.insert(waiter, reply);
            }
            Ok(OpenOutcome::Load(request)) => {
                self.waiters.insert(waiter, reply);
                self.spawn_load(request);
            }
            Err(error) => respond(reply, Err(error.into()), "Open"),
        }
    }

    fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Finished { ticket, result } => {
                if let Some(timer) = self.delay_timers.remove(&ticket) {
                    timer.abort();
                }
                match self.system.complete_load(ticket, result) {
                    LoadProgress::Next(request) => self.spawn_load(request),
                    LoadProgress::Resolved(resolution) => self.resolve(resolution),
                    LoadProgress::Stale => {
                        debug!(target: "ui::worker", ticket = %ticket, "stale load result dropped");
                    }
                }
            }
            LoadEvent::Delayed { ticket, elapsed } => {
                self.delay_timers.remove(&ticket);
                self.system.mark_delayed(ticket, elapsed);
            }
        }
    }

    /// Run the loader on its own task and arm the delay timer.
    fn spawn_load(&mut self, request: LoadRequest) {
        let LoadRequest {
            ticket, kind, path, ..
        } = request;
        debug!(target: "ui::worker", ticket = %ticket, kind = %kind, path = %path, "load started");

        let loader = Arc::clone(&self.loader);
        let load_tx = self.load_tx.clone();
        tokio::spawn(async move {
            let result = loader.load(&kind, &path).await;
            // Worker gone: nobody is waiting for this window any more.
            let _ = load_tx.send(LoadEvent::Finished { ticket, result });
        });

        let timer_tx = self.load_tx.clone();
        let timeout = self.load_delay_timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = timer_tx.send(LoadEvent::Delayed {
                ticket,
                elapsed: timeout,
            });
        });
        self.delay_timers.insert(ticket, timer);
    }

    /// Answer every waiter of a finished open, in request order.
    fn resolve(&mut self, resolution: OpenResolution) {
        let OpenResolution {
            key,
            waiters,
            result,
        } = resolution;
        if let Err(error) = &result {
            warn!(
                target: "ui::worker",
                key = %key,
                error = %error,
                kind = error.as_str(),
                waiters = waiters.len(),
                "open failed"
            );
        }

        for waiter in waiters {
            let Some(reply) = self.waiters.remove(&waiter) else {
                continue;
            };
            let answer = result.clone().map_err(Into::into);
            if reply.send(answer).is_err() {
                debug!(target: "ui::worker", key = %key, "open waiter dropped before resolution");
            }
        }
    }

    fn status(&self) -> UiStatus {
        UiStatus {
            open_controllers: self.system.open_count(),
            loads_in_flight: self.system.in_flight_count(),
            next_band: self.system.next_band(),
            max_sorting_order: self.system.max_sorting_order(false),
            full_screen_open: self.system.is_full_screen_open(),
            active_full_screen: self.system.active_full_screen(),
            culling: self.system.is_culling(),
            paused: self.system.is_paused(),
        }
    }

    fn flush_events(&mut self) {
        for event in self.system.drain_events() {
            self.event_bus.publish(event);
        }
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "ui::worker", command, "reply channel closed (caller dropped)");
    }
}
