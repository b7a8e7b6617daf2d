use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use uuid::Uuid;

use crate::puzzle::{PuzzleRound, RoundStatus, TickOutcome, ToggleOutcome};
use crate::store::UserStore;
use crate::user::{LevelAdvance, UserState, WithdrawError};
use crate::view::{AppTab, ViewEffect, ViewEvent, ViewState};
use crate::withdraw::{WithdrawFormError, WithdrawRequest};

/// Addresses countdown ticks to the round that was live when the ticker
/// started. A handle from a replaced round is stale and its ticks are
/// dropped before they can touch the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownHandle {
    round_seq: u64,
}

/// Outcome of a tile tap at the app level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// No live round, round already finished, or index out of range.
    Ignored,
    Toggled,
    /// The round was won and the progression update has been committed.
    Won(LevelAdvance),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawRejection {
    Form(WithdrawFormError),
    Funds(WithdrawError),
}

/// The single owner of all application state.
///
/// Every mutation goes through a method here; the host run-loop delivers one
/// event at a time (tile tap, countdown second, navigation), so the state has
/// exactly one writer and no locking. The full `UserState` snapshot is
/// persisted after each user-state change.
#[derive(Debug)]
pub struct MindMaze {
    user: UserState,
    view: ViewState,
    round: Option<PuzzleRound>,
    round_seq: u64,
    seed_state: u64,
    store: UserStore,
}

impl MindMaze {
    pub fn new(store: UserStore) -> Self {
        Self::with_seed(store, seed_from_time())
    }

    /// Like `new`, but with a fixed round-seed source so every generated
    /// target pattern is reproducible.
    pub fn with_seed(store: UserStore, seed: u64) -> Self {
        Self {
            user: store.load(),
            view: ViewState::default(),
            round: None,
            round_seq: 0,
            seed_state: seed,
            store,
        }
    }

    pub fn user(&self) -> &UserState {
        &self.user
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn tab(&self) -> AppTab {
        self.view.tab
    }

    pub fn round(&self) -> Option<&PuzzleRound> {
        self.round.as_ref()
    }

    pub fn round_status(&self) -> RoundStatus {
        self.round
            .as_ref()
            .map(|round| round.status())
            .unwrap_or(RoundStatus::Idle)
    }

    pub fn time_left_secs(&self) -> Option<u32> {
        self.round.as_ref().map(|round| round.time_left_secs())
    }

    /// Start (or restart) a round for the current level, replacing any live
    /// round. Only ticks carrying the returned handle will land.
    pub fn start_round(&mut self) -> CountdownHandle {
        self.round_seq += 1;
        let seed = self.next_seed();
        self.round = Some(PuzzleRound::start(self.user.level(), seed));
        CountdownHandle {
            round_seq: self.round_seq,
        }
    }

    /// Drop the live round and invalidate every outstanding countdown handle.
    pub fn discard_round(&mut self) {
        self.round = None;
        self.round_seq += 1;
    }

    /// Deliver one wall-clock second to the round addressed by `handle`.
    /// Returns `None` when the handle is stale; a stale tick never mutates
    /// the current round.
    pub fn tick(&mut self, handle: CountdownHandle) -> Option<TickOutcome> {
        if handle.round_seq != self.round_seq {
            return None;
        }
        self.round.as_mut().map(|round| round.tick_second())
    }

    /// Tap a tile. On a win the reward, level, and play count are committed
    /// in the same call and the snapshot is written.
    pub fn toggle_tile(&mut self, index: usize) -> TapOutcome {
        let Some(round) = self.round.as_mut() else {
            return TapOutcome::Ignored;
        };
        match round.toggle_tile(index) {
            ToggleOutcome::Ignored => TapOutcome::Ignored,
            ToggleOutcome::Toggled => TapOutcome::Toggled,
            ToggleOutcome::Won => {
                let advance = self.user.advance_level(Utc::now());
                self.persist();
                TapOutcome::Won(advance)
            }
        }
    }

    /// Validate a withdrawal form and, if it passes, debit the balance and
    /// record the pending ledger entry.
    pub fn withdraw(&mut self, request: &WithdrawRequest) -> Result<Uuid, WithdrawRejection> {
        request
            .validate(self.user.balance())
            .map_err(WithdrawRejection::Form)?;
        let id = self
            .user
            .record_withdrawal(request.amount, &request.destination(), Utc::now())
            .map_err(WithdrawRejection::Funds)?;
        self.persist();
        Ok(id)
    }

    /// Adopt a username from the auth overlay. On success the overlay closes.
    pub fn log_in(&mut self, username: &str) -> bool {
        if !self.user.log_in(username) {
            return false;
        }
        self.apply_view_event(ViewEvent::CloseAuth);
        self.persist();
        true
    }

    pub fn log_out(&mut self) {
        self.user.log_out();
        self.persist();
    }

    pub fn select_tab(&mut self, tab: AppTab) {
        self.apply_view_event(ViewEvent::SelectTab(tab));
    }

    pub fn open_auth(&mut self) {
        self.apply_view_event(ViewEvent::OpenAuth);
    }

    pub fn close_auth(&mut self) {
        self.apply_view_event(ViewEvent::CloseAuth);
    }

    fn apply_view_event(&mut self, event: ViewEvent) {
        let (view, effect) = self.view.handle(event);
        self.view = view;
        if effect == ViewEffect::DiscardRound {
            self.discard_round();
        }
    }

    fn next_seed(&mut self) -> u64 {
        self.seed_state = self
            .seed_state
            .wrapping_mul(0x5851_F42D_4C95_7F2D)
            .wrapping_add(0x1405_7B7E_F767_814F);
        self.seed_state
    }

    /// Fire-and-forget full-snapshot write; every write carries the latest
    /// state, so ordering between writes does not matter.
    fn persist(&self) {
        let _ = self.store.save(&self.user);
    }
}

fn seed_from_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::withdraw::WithdrawMethod;
    use std::fs;

    fn temp_app(tag: &str) -> MindMaze {
        let path = std::env::temp_dir().join(format!("mindmaze-app-{tag}-{}.json", Uuid::new_v4()));
        MindMaze::with_seed(UserStore::at(path), 0xDEAD_BEEF)
    }

    fn cleanup(app: &MindMaze) {
        let _ = fs::remove_file(app.store.path());
    }

    /// Tap every tile the target wants lit; the last tap must win.
    fn play_round_to_win(app: &mut MindMaze) -> TapOutcome {
        let lit: Vec<usize> = app
            .round()
            .expect("a live round")
            .target_pattern()
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 1)
            .map(|(i, _)| i)
            .collect();
        if lit.is_empty() {
            // All-dark target: equality is only checked after a flip, so
            // move off the target and back onto it.
            app.toggle_tile(0);
            return app.toggle_tile(0);
        }

        let mut last = TapOutcome::Ignored;
        for index in lit {
            last = app.toggle_tile(index);
        }
        last
    }

    #[test]
    fn no_round_means_idle_and_ignored_taps() {
        let mut app = temp_app("idle");
        assert_eq!(app.round_status(), RoundStatus::Idle);
        assert_eq!(app.toggle_tile(0), TapOutcome::Ignored);
        cleanup(&app);
    }

    #[test]
    fn winning_a_round_advances_the_level_and_persists() {
        let mut app = temp_app("win");
        app.start_round();

        let outcome = play_round_to_win(&mut app);
        let TapOutcome::Won(advance) = outcome else {
            panic!("expected a win, got {outcome:?}");
        };
        assert_eq!(advance.new_level, 2);
        assert_eq!(app.user().level(), 2);
        assert_eq!(app.user().total_games_played(), 1);
        assert_eq!(app.round_status(), RoundStatus::Won);

        // The snapshot on disk already reflects the win.
        let reloaded = app.store.load();
        assert_eq!(reloaded.level(), 2);
        cleanup(&app);
    }

    #[test]
    fn stale_handle_never_touches_the_new_round() {
        let mut app = temp_app("stale");
        let old_handle = app.start_round();
        let new_handle = app.start_round();
        let time_left = app.time_left_secs().unwrap();

        assert_eq!(app.tick(old_handle), None);
        assert_eq!(app.time_left_secs().unwrap(), time_left);

        assert_eq!(
            app.tick(new_handle),
            Some(TickOutcome::Running {
                remaining_secs: time_left - 1
            })
        );
        cleanup(&app);
    }

    #[test]
    fn running_out_the_clock_loses_the_round() {
        let mut app = temp_app("timeout");
        let handle = app.start_round();
        let limit = app.time_left_secs().unwrap();

        for _ in 0..limit - 1 {
            assert!(matches!(
                app.tick(handle),
                Some(TickOutcome::Running { .. })
            ));
        }
        assert_eq!(app.tick(handle), Some(TickOutcome::Expired));
        assert_eq!(app.round_status(), RoundStatus::Lost);
        assert_eq!(app.tick(handle), Some(TickOutcome::NotRunning));
        cleanup(&app);
    }

    #[test]
    fn leaving_the_game_tab_invalidates_the_countdown() {
        let mut app = temp_app("navigate");
        let handle = app.start_round();

        app.select_tab(AppTab::Wallet);
        assert_eq!(app.round_status(), RoundStatus::Idle);
        assert_eq!(app.tick(handle), None);
        cleanup(&app);
    }

    #[test]
    fn login_closes_the_auth_overlay_and_persists() {
        let mut app = temp_app("login");
        app.open_auth();
        assert!(app.view().auth_open);

        assert!(app.log_in("MazeRunner"));
        assert!(!app.view().auth_open);
        assert!(app.user().is_logged_in());
        assert_eq!(app.store.load().username(), "MazeRunner");

        app.log_out();
        assert!(!app.store.load().is_logged_in());
        cleanup(&app);
    }

    #[test]
    fn rejected_withdrawal_leaves_state_and_snapshot_alone() {
        let mut app = temp_app("reject");
        let request = WithdrawRequest {
            amount: 2_000,
            method: WithdrawMethod::Bkash,
            account: "01712345678".to_string(),
        };

        assert_eq!(
            app.withdraw(&request),
            Err(WithdrawRejection::Form(WithdrawFormError::OverBalance))
        );
        assert_eq!(app.user().balance(), 0);
        assert!(app.user().history().is_empty());
        cleanup(&app);
    }

    #[test]
    fn next_level_round_shrinks_the_clock_as_levels_pile_up() {
        let mut app = temp_app("difficulty");
        for _ in 0..10 {
            app.start_round();
            assert!(matches!(play_round_to_win(&mut app), TapOutcome::Won(_)));
        }
        assert_eq!(app.user().level(), 11);

        app.start_round();
        // Level 11: grid grows to 4x4 and the limit drops to 28s.
        assert_eq!(app.round().unwrap().grid_size(), 4);
        assert_eq!(app.time_left_secs(), Some(28));
        cleanup(&app);
    }
}
