use super::*;
use crate::error::InputEverywhereError;
use crate::state::keys;
use crate::storage::MemoryStore;
use serde_json::Value;

fn coordinator() -> (Coordinator, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Coordinator::start(store.clone()), store)
}

fn drain(rx: &Receiver<Notification>) -> Vec<Notification> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[test]
fn first_run_seeds_and_persists_defaults() {
    let (coordinator, store) = coordinator();
    let state = coordinator.state();
    assert_eq!(state, SharedState::default());
    assert_eq!(store.get(keys::EXTENSION_ENABLED), Some(Value::Bool(true)));
    assert_eq!(store.get(keys::HABIT_MODE_ENABLED), Some(Value::Bool(true)));
    assert_eq!(store.get(keys::ADVANCED_MODE_ENABLED), Some(Value::Bool(false)));
}

#[test]
fn start_rehydrates_stored_flags() {
    let store = Arc::new(MemoryStore::new());
    store
        .set_many(&[
            (keys::EXTENSION_ENABLED, Value::Bool(false)),
            (keys::HABIT_MODE_ENABLED, Value::Bool(true)),
            (keys::ADVANCED_MODE_ENABLED, Value::Bool(true)),
        ])
        .unwrap();
    let coordinator = Coordinator::start(store);
    assert!(!coordinator.state().extension_enabled);
    assert!(coordinator.state().advanced_mode_enabled);
}

#[test]
fn set_flag_is_idempotent_and_persisted() {
    let (mut coordinator, store) = coordinator();
    let (_, rx) = coordinator.attach_page("example.com");

    let once = coordinator.apply_command(Flag::HabitMode, false);
    assert_eq!(SharedState::load(store.as_ref()), once);
    let twice = coordinator.apply_command(Flag::HabitMode, false);
    assert_eq!(once, twice);
    assert_eq!(SharedState::load(store.as_ref()), twice);

    // No dedup: both commands were broadcast
    let flag_changed = Notification::FlagChanged {
        field: Flag::HabitMode,
        value: false,
    };
    assert_eq!(drain(&rx), vec![flag_changed, flag_changed]);
}

#[test]
fn broadcast_reaches_every_page_in_order() {
    let (mut coordinator, _) = coordinator();
    let (_, a) = coordinator.attach_page("a.example");
    let (_, b) = coordinator.attach_page("b.example");

    coordinator.apply_command(Flag::AdvancedMode, true);
    coordinator.apply_command(Flag::Extension, false);

    let expected = vec![
        Notification::FlagChanged {
            field: Flag::AdvancedMode,
            value: true,
        },
        Notification::FlagChanged {
            field: Flag::Extension,
            value: false,
        },
    ];
    assert_eq!(drain(&a), expected);
    assert_eq!(drain(&b), expected);
}

#[test]
fn closed_inbox_is_pruned_silently() {
    let (mut coordinator, _) = coordinator();
    let (gone, rx) = coordinator.attach_page("gone.example");
    let (alive, alive_rx) = coordinator.attach_page("alive.example");
    drop(rx);

    coordinator.apply_command(Flag::HabitMode, false);
    assert_eq!(coordinator.page_ids(), vec![alive]);
    assert!(!coordinator.send_to_page(gone, Notification::RunDebug));
    assert_eq!(drain(&alive_rx).len(), 1);
}

#[test]
fn unknown_flag_is_rejected() {
    let (mut coordinator, _) = coordinator();
    let before = coordinator.state();
    assert!(matches!(
        coordinator.apply_raw("darkMode", true),
        Err(InputEverywhereError::UnknownFlag(_))
    ));
    assert_eq!(coordinator.state(), before);
    assert!(coordinator.apply_raw("advancedModeEnabled", true).is_ok());
}

#[test]
fn global_shortcuts_toggle_or_forward() {
    let (mut coordinator, _) = coordinator();
    let (first, first_rx) = coordinator.attach_page("a.example");
    let (_, second_rx) = coordinator.attach_page("b.example");
    assert!(coordinator.focus_page(first));

    coordinator.handle_shortcut(ShortcutCommand::ToggleHabitMode);
    assert!(!coordinator.state().habit_mode_enabled);

    coordinator.handle_shortcut(ShortcutCommand::ToggleAdvancedMode);
    coordinator.handle_shortcut(ShortcutCommand::OpenAdvancedOverlay);
    // Advanced mode is flipped by the page, not here
    assert!(!coordinator.state().advanced_mode_enabled);

    let habit = Notification::FlagChanged {
        field: Flag::HabitMode,
        value: false,
    };
    assert_eq!(
        drain(&first_rx),
        vec![
            habit,
            Notification::ToggleAdvancedModeOnFocusedPage,
            Notification::OpenAssistantOnFocusedPage
        ]
    );
    assert_eq!(drain(&second_rx), vec![habit]);
}

#[test]
fn focused_directive_without_focus_is_dropped() {
    let (mut coordinator, _) = coordinator();
    let (id, _rx) = coordinator.attach_page("a.example");
    coordinator.detach_page(id);
    assert_eq!(coordinator.focused_page(), None);
    assert!(!coordinator.send_to_focused(Notification::OpenAssistantOnFocusedPage));
}

#[test]
fn context_menu_targets_one_page() {
    let (mut coordinator, _) = coordinator();
    let (a, a_rx) = coordinator.attach_page("a.example");
    let (_, b_rx) = coordinator.attach_page("b.example");
    assert!(coordinator.handle_context_menu(a, ContextMenuAction::TestOverlay));
    assert_eq!(drain(&a_rx), vec![Notification::TestOverlay]);
    assert!(drain(&b_rx).is_empty());
}

#[test]
fn handle_goes_quiet_when_process_ends() {
    let process = CoordinatorProcess::start(Arc::new(MemoryStore::new()));
    let handle = process.handle();
    assert!(handle.is_alive());
    assert_eq!(handle.get_state(), Some(SharedState::default()));

    drop(process);
    assert!(!handle.is_alive());
    assert_eq!(handle.get_state(), None);
    assert_eq!(handle.set_flag(Flag::HabitMode, false), None);
    assert!(handle.attach_page("a.example").is_none());
}

#[test]
fn handle_json_answers_get_state_only() {
    let process = CoordinatorProcess::start(Arc::new(MemoryStore::new()));
    let handle = process.handle();

    let reply = handle.handle_json(r#"{"action":"getState"}"#).unwrap();
    let state: SharedState = serde_json::from_str(&reply).unwrap();
    assert_eq!(state, SharedState::default());

    assert_eq!(
        handle.handle_json(r#"{"action":"setFlag","field":"habitModeEnabled","value":false}"#),
        None
    );
    assert!(!process.with(|c| c.state().habit_mode_enabled));

    assert_eq!(handle.handle_json(r#"{"action":"explode"}"#), None);
    assert_eq!(handle.handle_json("not json"), None);
}
