use stash_core::{update, Msg, SyncState};

#[test]
fn out_of_step_messages_are_ignored_when_idle() {
    let state = SyncState::new();
    for msg in [
        Msg::BackoffElapsed,
        Msg::CancelRequested,
        Msg::Acknowledged,
        Msg::FetchFailed("late".into()),
        Msg::RateLimited { retry_after_secs: 3 },
    ] {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
