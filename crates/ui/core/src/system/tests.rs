use core::time::Duration;

use super::*;
use crate::catalog::WindowBlueprint;
use crate::error::LoadError;
use crate::types::{InstanceId, ResourcePath, WindowKind, WindowOptions};

const FULL_SCREEN: &[&str] = &["map"];

fn catalog() -> WindowCatalog {
    WindowCatalog::from_entries([
        WindowBlueprint::new("inventory", "ui/inventory")
            .category(UiCategory::Popup)
            .child("tooltip")
            .child("slots"),
        WindowBlueprint::new("tooltip", "ui/tooltip"),
        WindowBlueprint::new("slots", "ui/slots"),
        WindowBlueprint::new("shop", "ui/shop").category(UiCategory::Popup),
        WindowBlueprint::new("dialog", "ui/dialog").category(UiCategory::Dialogue),
        WindowBlueprint::new("hud", "ui/hud")
            .category(UiCategory::Hud)
            .persistent(),
        WindowBlueprint::new("map", "ui/map"),
        WindowBlueprint::new("bag", "ui/bag")
            .child("missing")
            .child("tooltip"),
    ])
}

fn system() -> WindowSystem {
    WindowSystem::new(catalog(), LayoutConfig::default())
}

fn key(kind: &str, instance: i32) -> ControllerKey {
    ControllerKey::new(kind, InstanceId(instance))
}

fn raw_for(kind: &WindowKind) -> RawWindow {
    if FULL_SCREEN.contains(&kind.as_str()) {
        RawWindow::full_screen()
    } else {
        RawWindow::new()
    }
}

/// Complete loads immediately until the open resolves; returns the loaded
/// kinds in load order.
fn drive(system: &mut WindowSystem, mut request: LoadRequest) -> (OpenResolution, Vec<WindowKind>) {
    let mut loaded = Vec::new();
    loop {
        loaded.push(request.kind.clone());
        let raw = raw_for(&request.kind);
        match system.complete_load(request.ticket, Ok(raw)) {
            LoadProgress::Next(next) => request = next,
            LoadProgress::Resolved(resolution) => return (resolution, loaded),
            LoadProgress::Stale => panic!("unexpected stale ticket"),
        }
    }
}

fn open_with(
    system: &mut WindowSystem,
    kind: &str,
    instance: i32,
    options: WindowOptions,
) -> ControllerInfo {
    match system
        .request_open(kind.into(), InstanceId(instance), options, WaiterId(0))
        .unwrap()
    {
        OpenOutcome::Load(request) => drive(system, request).0.result.unwrap(),
        OpenOutcome::Ready(info) => info,
        OpenOutcome::Queued => panic!("nothing else should be loading"),
    }
}

fn open(system: &mut WindowSystem, kind: &str, instance: i32) -> ControllerInfo {
    open_with(system, kind, instance, WindowOptions::empty())
}

fn load_request(system: &mut WindowSystem, kind: &str, instance: i32, waiter: u64) -> LoadRequest {
    match system
        .request_open(kind.into(), InstanceId(instance), WindowOptions::empty(), WaiterId(waiter))
        .unwrap()
    {
        OpenOutcome::Load(request) => request,
        other => panic!("expected a load, got {other:?}"),
    }
}

fn lifecycle(system: &mut WindowSystem) -> Vec<LifecycleEvent> {
    system
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            UiEvent::Lifecycle(event) => Some(event),
            UiEvent::Notification(_) => None,
        })
        .collect()
}

fn notifications(system: &mut WindowSystem) -> Vec<Notification> {
    system
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            UiEvent::Notification(notification) => Some(notification),
            UiEvent::Lifecycle(_) => None,
        })
        .collect()
}

fn order_of(system: &WindowSystem, kind: &str, instance: i32) -> Option<i32> {
    system.get(&key(kind, instance)).and_then(|info| info.sorting_order)
}

#[test]
fn open_count_tracks_opens_and_closes() {
    let mut system = system();
    open(&mut system, "shop", 1);
    open(&mut system, "shop", 2);
    open(&mut system, "hud", 0);
    assert_eq!(system.open_count(), 3);

    assert_eq!(system.close(&key("shop", 1)), CloseOutcome::Closed);
    assert_eq!(system.open_count(), 2);

    assert_eq!(system.close(&key("shop", 1)), CloseOutcome::NotOpen);
    assert_eq!(system.open_count(), 2);
    assert!(!system.contains(&key("shop", 1)));
    assert!(system.contains(&key("shop", 2)));
}

#[test]
fn concurrent_opens_share_one_load_in_request_order() {
    let mut system = system();
    let request = load_request(&mut system, "shop", 1, 1);

    for waiter in [2, 3] {
        let outcome = system
            .request_open("shop".into(), InstanceId(1), WindowOptions::empty(), WaiterId(waiter))
            .unwrap();
        assert_eq!(outcome, OpenOutcome::Queued);
    }
    assert_eq!(system.in_flight_count(), 1);
    assert_eq!(system.open_count(), 1);

    let (resolution, loaded) = drive(&mut system, request);
    assert_eq!(loaded, vec![WindowKind::from("shop")]);
    assert_eq!(resolution.waiters, vec![WaiterId(1), WaiterId(2), WaiterId(3)]);
    assert_eq!(resolution.result.unwrap().sorting_order, Some(1));
    assert_eq!(system.in_flight_count(), 0);

    system.drain_events();
    let outcome = system
        .request_open("shop".into(), InstanceId(1), WindowOptions::empty(), WaiterId(4))
        .unwrap();
    assert!(matches!(outcome, OpenOutcome::Ready(_)));
    assert_eq!(
        lifecycle(&mut system),
        vec![LifecycleEvent::Opened {
            key: key("shop", 1),
            reopened: true
        }]
    );
}

#[test]
fn sub_windows_load_parent_first_and_close_children_first() {
    let mut system = system();
    let request = load_request(&mut system, "inventory", 0, 1);
    let (resolution, loaded) = drive(&mut system, request);

    assert_eq!(
        loaded,
        vec![
            WindowKind::from("inventory"),
            WindowKind::from("tooltip"),
            WindowKind::from("slots"),
        ]
    );
    let info = resolution.result.unwrap();
    assert_eq!(info.sorting_order, Some(1));
    let child_orders: Vec<_> = info.children.iter().map(|child| child.sorting_order).collect();
    assert_eq!(child_orders, vec![Some(2), Some(3)]);
    assert!(info.children.iter().all(|child| child.visible));
    assert_eq!(system.next_band(), 13);

    system.drain_events();
    assert_eq!(system.close(&key("inventory", 0)), CloseOutcome::Closed);

    let closed: Vec<_> = lifecycle(&mut system)
        .into_iter()
        .filter_map(|event| match event {
            LifecycleEvent::Closed { key, .. } => Some(key.kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        closed,
        vec![
            WindowKind::from("tooltip"),
            WindowKind::from("slots"),
            WindowKind::from("inventory"),
        ]
    );
    assert_eq!(system.next_band(), 1);
}

#[test]
fn unregistered_kind_fails_without_registering() {
    let mut system = system();
    let result =
        system.request_open("ghost".into(), InstanceId(0), WindowOptions::empty(), WaiterId(1));

    assert_eq!(
        result,
        Err(UiError::ResourceNotFound {
            kind: WindowKind::from("ghost"),
            path: None
        })
    );
    assert_eq!(system.open_count(), 0);
    assert_eq!(system.in_flight_count(), 0);
}

#[test]
fn out_of_order_close_slides_later_bands_down() {
    let mut system = system();
    open(&mut system, "inventory", 0);
    assert_eq!(system.next_band(), 13);
    open(&mut system, "shop", 0);
    assert_eq!(order_of(&system, "shop", 0), Some(13));
    assert_eq!(system.next_band(), 23);

    system.close(&key("inventory", 0));

    assert_eq!(system.next_band(), 11);
    assert_eq!(order_of(&system, "shop", 0), Some(1));

    open(&mut system, "dialog", 0);
    assert_eq!(order_of(&system, "dialog", 0), Some(11));
}

#[test]
fn full_screen_hides_lower_controllers_until_closed() {
    let mut system = system();
    open(&mut system, "shop", 0);
    system.drain_events();

    let map = open(&mut system, "map", 0);
    assert!(map.full_screen);
    assert_eq!(map.sorting_order, Some(11));
    assert!(system.is_full_screen_open());
    assert!(system.is_culling() && system.is_paused());
    assert_eq!(system.active_full_screen(), Some(key("map", 0)));

    let shop = system.get(&key("shop", 0)).unwrap();
    assert!(!shop.is_opened && !shop.visible);

    let events = system.drain_events();
    assert!(events.contains(&LifecycleEvent::HiddenByFullScreen { key: key("shop", 0) }.into()));
    assert!(events.contains(&Notification::CameraCulling { enabled: true }.into()));
    assert!(events.contains(&Notification::Pause { paused: true }.into()));

    system.close(&key("map", 0));

    let shop = system.get(&key("shop", 0)).unwrap();
    assert!(shop.is_opened && shop.visible);
    assert!(!system.is_full_screen_open());
    assert!(!system.is_culling() && !system.is_paused());
    let events = system.drain_events();
    assert!(events.contains(&LifecycleEvent::ShownByFullScreen { key: key("shop", 0) }.into()));
    assert!(events.contains(&Notification::CameraCulling { enabled: false }.into()));
}

#[test]
fn full_screen_hides_sub_windows_of_lower_controllers() {
    let mut system = system();
    open(&mut system, "inventory", 0);
    let map = open(&mut system, "map", 0);
    assert_eq!(map.sorting_order, Some(13));

    let inventory = system.get(&key("inventory", 0)).unwrap();
    assert!(!inventory.visible);
    assert!(inventory.children.iter().all(|child| !child.visible && !child.is_opened));
    let hidden = lifecycle(&mut system)
        .into_iter()
        .filter(|event| matches!(event, LifecycleEvent::HiddenByFullScreen { .. }))
        .count();
    assert_eq!(hidden, 3);

    system.close(&key("map", 0));

    let inventory = system.get(&key("inventory", 0)).unwrap();
    assert!(inventory.visible);
    assert!(inventory.children.iter().all(|child| child.visible && child.is_opened));
}

#[test]
fn user_hidden_window_stays_hidden_after_full_screen_closes() {
    let mut system = system();
    open(&mut system, "shop", 0);
    system.hide(&key("shop", 0)).unwrap();
    open(&mut system, "map", 0);

    system.close(&key("map", 0));

    let shop = system.get(&key("shop", 0)).unwrap();
    assert!(!shop.visible);
    assert!(!system.is_opened(&key("shop", 0)));
}

#[test]
fn hidden_controller_keeps_sub_windows_hidden_after_full_screen_closes() {
    let mut system = system();
    open(&mut system, "inventory", 0);
    system.hide(&key("inventory", 0)).unwrap();
    open(&mut system, "map", 0);
    system.close(&key("map", 0));

    let inventory = system.get(&key("inventory", 0)).unwrap();
    assert!(!inventory.visible);
    assert!(inventory.children.iter().all(|child| !child.visible));

    system.show(&key("inventory", 0)).unwrap();
    let inventory = system.get(&key("inventory", 0)).unwrap();
    assert!(inventory.visible);
    assert!(inventory.children.iter().all(|child| child.visible));
}

#[test]
fn closing_while_loading_is_deferred_until_load_resolves() {
    let mut system = system();
    let request = load_request(&mut system, "inventory", 0, 1);

    assert_eq!(system.close(&key("inventory", 0)), CloseOutcome::Deferred);
    assert!(system.contains(&key("inventory", 0)));

    let progress = system.complete_load(request.ticket, Ok(RawWindow::new()));
    let LoadProgress::Resolved(resolution) = progress else {
        panic!("expected the open to resolve, got {progress:?}");
    };
    assert_eq!(resolution.waiters, vec![WaiterId(1)]);
    assert_eq!(
        resolution.result,
        Err(UiError::ClosedWhileLoading {
            key: key("inventory", 0)
        })
    );
    assert!(!system.contains(&key("inventory", 0)));
    assert_eq!(system.next_band(), 1);

    let closed = lifecycle(&mut system)
        .iter()
        .filter(|event| matches!(event, LifecycleEvent::Closed { .. }))
        .count();
    assert_eq!(closed, 3);
}

#[test]
fn show_and_hide_cascade_to_open_sub_windows() {
    let mut system = system();
    open(&mut system, "inventory", 0);
    system.drain_events();

    system.hide(&key("inventory", 0)).unwrap();
    assert_eq!(
        lifecycle(&mut system),
        vec![
            LifecycleEvent::Hidden { key: key("inventory", 0) },
            LifecycleEvent::Hidden { key: key("tooltip", 0) },
            LifecycleEvent::Hidden { key: key("slots", 0) },
        ]
    );
    let info = system.get(&key("inventory", 0)).unwrap();
    assert!(!info.visible && !info.is_opened);
    assert_eq!(info.state, ControllerState::Hidden);
    assert_eq!(info.children.len(), 2);
    assert!(info.children.iter().all(|child| !child.visible && !child.is_opened));

    system.show(&key("inventory", 0)).unwrap();
    assert_eq!(lifecycle(&mut system).len(), 3);
    assert!(system.is_opened(&key("inventory", 0)));
    let info = system.get(&key("inventory", 0)).unwrap();
    assert!(info.children.iter().all(|child| child.visible && child.is_opened));
}

#[test]
fn show_and_hide_report_unusable_controllers() {
    let mut system = system();
    assert_eq!(
        system.show(&key("shop", 0)),
        Err(UiError::StaleReference { key: key("shop", 0) })
    );

    let _request = load_request(&mut system, "shop", 0, 1);
    assert_eq!(
        system.hide(&key("shop", 0)),
        Err(UiError::NotReady { key: key("shop", 0) })
    );
}

#[test]
fn category_close_skips_other_categories() {
    let mut system = system();
    open(&mut system, "shop", 0);
    open(&mut system, "shop", 1);
    open(&mut system, "dialog", 0);
    open(&mut system, "tooltip", 5);

    let closed = system.close_by_category(UiCategory::Popup);
    assert_eq!(closed.len(), 2);
    assert!(closed.iter().all(|(_, outcome)| *outcome == CloseOutcome::Closed));
    assert_eq!(system.open_count(), 2);

    assert!(system.close_by_category(UiCategory::None).is_empty());
    assert_eq!(system.open_count(), 2);

    system.close_all();
    assert_eq!(system.open_count(), 0);
    assert_eq!(system.next_band(), 1);
}

#[test]
fn scene_change_keeps_persistent_windows_and_restarts_bands() {
    let mut system = system();
    open(&mut system, "hud", 0);
    open(&mut system, "shop", 0);
    assert_eq!(system.next_band(), 21);

    let closed = system.begin_scene_change();
    assert_eq!(closed, vec![(key("shop", 0), CloseOutcome::Closed)]);
    assert!(system.contains(&key("hud", 0)));
    assert_eq!(system.next_band(), 2);

    open(&mut system, "dialog", 0);
    assert_eq!(order_of(&system, "dialog", 0), Some(2));
    system.close(&key("dialog", 0));
    assert_eq!(order_of(&system, "hud", 0), Some(1));
    assert_eq!(system.next_band(), 2);

    system.drain_events();
    system.complete_scene_change();
    let rebound = notifications(&mut system)
        .iter()
        .filter(|notification| matches!(notification, Notification::CameraRebound { .. }))
        .count();
    assert_eq!(rebound, 1);
}

#[test]
fn scene_change_leaves_later_survivors_in_place() {
    let mut system = system();
    open(&mut system, "shop", 0);
    open(&mut system, "hud", 0);
    assert_eq!(order_of(&system, "shop", 0), Some(1));
    assert_eq!(order_of(&system, "hud", 0), Some(11));

    system.begin_scene_change();

    assert!(!system.contains(&key("shop", 0)));
    assert_eq!(order_of(&system, "hud", 0), Some(11));

    open(&mut system, "dialog", 0);
    assert_eq!(order_of(&system, "dialog", 0), Some(12));

    system.close(&key("dialog", 0));
    assert_eq!(order_of(&system, "hud", 0), Some(11));
    open(&mut system, "shop", 0);
    assert_eq!(order_of(&system, "shop", 0), Some(12));
}

#[test]
fn bulk_close_follows_creation_order() {
    let mut system = system();
    for kind in ["shop", "inventory", "dialog", "map", "bag"] {
        open(&mut system, kind, 0);
    }
    open(&mut system, "shop", 1);
    system.drain_events();

    let closed: Vec<ControllerKey> = system.close_all().into_iter().map(|(key, _)| key).collect();
    assert_eq!(
        closed,
        vec![
            key("shop", 0),
            key("inventory", 0),
            key("dialog", 0),
            key("map", 0),
            key("bag", 0),
            key("shop", 1),
        ]
    );
}

#[test]
fn delay_indicator_tracks_slow_loads() {
    let mut system = system();
    let shop = load_request(&mut system, "shop", 0, 1);
    let dialog = load_request(&mut system, "dialog", 0, 2);
    let elapsed = Duration::from_secs(5);

    assert!(system.mark_delayed(shop.ticket, elapsed));
    assert!(!system.mark_delayed(shop.ticket, elapsed));
    assert_eq!(
        notifications(&mut system),
        vec![
            Notification::LoadDelayed {
                key: key("shop", 0),
                elapsed
            },
            Notification::DelayIndicator { visible: true },
        ]
    );

    assert!(system.mark_delayed(dialog.ticket, elapsed));
    assert_eq!(notifications(&mut system).len(), 1);

    system.complete_load(shop.ticket, Ok(RawWindow::new()));
    assert!(!notifications(&mut system).contains(&Notification::DelayIndicator { visible: false }));

    system.complete_load(dialog.ticket, Ok(RawWindow::new()));
    assert!(notifications(&mut system).contains(&Notification::DelayIndicator { visible: false }));
    assert!(!system.mark_delayed(dialog.ticket, elapsed));
}

#[test]
fn root_load_failure_resolves_waiters_with_resource_error() {
    let mut system = system();
    let request = load_request(&mut system, "shop", 0, 1);

    let progress = system.complete_load(
        request.ticket,
        Err(LoadError::NotFound(ResourcePath::new("ui/shop"))),
    );

    let LoadProgress::Resolved(resolution) = progress else {
        panic!("expected the open to resolve, got {progress:?}");
    };
    assert_eq!(
        resolution.result,
        Err(UiError::ResourceNotFound {
            kind: WindowKind::from("shop"),
            path: Some(ResourcePath::new("ui/shop")),
        })
    );
    assert_eq!(system.open_count(), 0);
    assert_eq!(system.next_band(), 1);
    assert_eq!(system.complete_load(request.ticket, Ok(RawWindow::new())), LoadProgress::Stale);
}

#[test]
fn sub_window_without_resource_is_skipped() {
    let mut system = system();
    let request = load_request(&mut system, "bag", 0, 1);
    let (resolution, loaded) = drive(&mut system, request);

    assert_eq!(loaded, vec![WindowKind::from("bag"), WindowKind::from("tooltip")]);
    let info = resolution.result.unwrap();
    assert_eq!(info.children.len(), 1);
    assert_eq!(info.children[0].sorting_order, Some(2));
}

#[test]
fn pinned_controller_uses_reserved_order() {
    let mut system = system();
    let info = open_with(&mut system, "shop", 0, WindowOptions::KEEP_SORTING_ORDER);

    assert_eq!(info.sorting_order, Some(LayoutConfig::DEFAULT_PINNED_ORDER));
    assert!(info.pinned);
    assert_eq!(system.next_band(), 1);
    assert_eq!(system.max_sorting_order(false), 0);
    assert_eq!(system.max_sorting_order(true), LayoutConfig::DEFAULT_PINNED_ORDER);

    system.close(&key("shop", 0));
    assert_eq!(system.next_band(), 1);
}

#[test]
fn standalone_full_screen_window_takes_part_in_arbitration() {
    let mut system = system();
    open(&mut system, "shop", 0);
    let window = system.open_standalone(RawWindow::full_screen(), 500);

    system.show_full_screen_window(window).unwrap();
    assert!(system.window(window).is_some_and(|handle| handle.is_visible()));
    assert!(system.is_full_screen_open());
    assert!(!system.get(&key("shop", 0)).unwrap().visible);
    assert_eq!(system.max_sorting_order(true), 1);

    system.close_standalone(window).unwrap();
    assert!(system.window(window).is_none());
    assert!(!system.is_full_screen_open());
    assert!(system.get(&key("shop", 0)).unwrap().visible);
    assert_eq!(
        system.close_standalone(window),
        Err(UiError::UnknownWindow { window })
    );
}
