use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppTab {
    Game,
    Wallet,
    Withdraw,
    Profile,
}

impl Default for AppTab {
    fn default() -> Self {
        Self::Game
    }
}

impl AppTab {
    pub const ALL: [AppTab; 4] = [AppTab::Game, AppTab::Wallet, AppTab::Withdraw, AppTab::Profile];

    pub fn label(self) -> &'static str {
        match self {
            AppTab::Game => "Game",
            AppTab::Wallet => "Wallet",
            AppTab::Withdraw => "Cash Out",
            AppTab::Profile => "Profile",
        }
    }
}

/// The navigation chrome: which tab is shown, and whether the auth overlay
/// sits on top of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub tab: AppTab,
    pub auth_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    SelectTab(AppTab),
    OpenAuth,
    CloseAuth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    None,
    /// The game screen is being unmounted; its live round and countdown must
    /// be discarded.
    DiscardRound,
}

impl ViewState {
    /// Pure transition function for the navigation state machine.
    ///
    /// Side-effects (dropping the live round when the game screen goes away)
    /// are reported via `ViewEffect` so callers stay deterministic and easy
    /// to test.
    pub fn handle(self, event: ViewEvent) -> (ViewState, ViewEffect) {
        match event {
            ViewEvent::SelectTab(tab) => {
                let effect = if self.tab == AppTab::Game && tab != AppTab::Game {
                    ViewEffect::DiscardRound
                } else {
                    ViewEffect::None
                };
                (ViewState { tab, ..self }, effect)
            }
            ViewEvent::OpenAuth => (
                ViewState {
                    auth_open: true,
                    ..self
                },
                ViewEffect::None,
            ),
            ViewEvent::CloseAuth => (
                ViewState {
                    auth_open: false,
                    ..self
                },
                ViewEffect::None,
            ),
        }
    }
}
