//! Top-level view states and the transitions between them.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Init,
    Settings,
    Loading,
    Loaded,
    /// An inline edit is being persisted
    Saving,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Startup { has_projects: bool },
    OpenSettings,
    /// A project scope was picked, a project was added, or the scope changed
    ProjectChosen,
    Refresh,
    Retry,
    LoadSucceeded,
    LoadFailed(String),
    SaveStarted,
    SaveFinished,
}

impl ViewState {
    /// The state reached from `self` on `event`, or `None` when the event is
    /// not valid here.
    pub fn on(&self, event: &ViewEvent) -> Option<ViewState> {
        use ViewEvent as E;
        use ViewState as S;

        let next = match (self, event) {
            (S::Init, E::Startup { has_projects: true }) => S::Loading,
            (S::Init, E::Startup { has_projects: false }) => S::Settings,

            (S::Settings, E::ProjectChosen) => S::Loading,

            (S::Loading, E::LoadSucceeded) => S::Loaded,
            (S::Loading, E::LoadFailed(message)) => S::Error(message.clone()),
            (S::Loading, E::ProjectChosen) => S::Loading,
            (S::Loading, E::OpenSettings) => S::Settings,

            (S::Loaded, E::Refresh | E::ProjectChosen) => S::Loading,
            (S::Loaded, E::OpenSettings) => S::Settings,
            (S::Loaded, E::SaveStarted) => S::Saving,

            (S::Saving, E::SaveFinished) => S::Loaded,

            (S::Error(_), E::Retry | E::Refresh | E::ProjectChosen) => S::Loading,
            (S::Error(_), E::OpenSettings) => S::Settings,

            _ => return None,
        };
        Some(next)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Init => "INIT",
            ViewState::Settings => "SETTINGS",
            ViewState::Loading => "LOADING",
            ViewState::Loaded => "LOADED",
            ViewState::Saving => "SAVING",
            ViewState::Error(_) => "ERROR",
        }
    }

    /// Whether the item list is the visible screen.
    pub fn shows_items(&self) -> bool {
        matches!(
            self,
            ViewState::Loading | ViewState::Loaded | ViewState::Saving
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> Vec<ViewState> {
        vec![
            ViewState::Init,
            ViewState::Settings,
            ViewState::Loading,
            ViewState::Loaded,
            ViewState::Saving,
            ViewState::Error("boom".into()),
        ]
    }

    fn all_events() -> Vec<ViewEvent> {
        vec![
            ViewEvent::Startup { has_projects: true },
            ViewEvent::Startup {
                has_projects: false,
            },
            ViewEvent::OpenSettings,
            ViewEvent::ProjectChosen,
            ViewEvent::Refresh,
            ViewEvent::Retry,
            ViewEvent::LoadSucceeded,
            ViewEvent::LoadFailed("bad".into()),
            ViewEvent::SaveStarted,
            ViewEvent::SaveFinished,
        ]
    }

    fn expected(state: &ViewState, event: &ViewEvent) -> Option<ViewState> {
        use ViewEvent as E;
        use ViewState as S;
        match (state, event) {
            (S::Init, E::Startup { has_projects }) => Some(if *has_projects {
                S::Loading
            } else {
                S::Settings
            }),
            (S::Settings, E::ProjectChosen) => Some(S::Loading),
            (S::Loading, E::LoadSucceeded) => Some(S::Loaded),
            (S::Loading, E::LoadFailed(m)) => Some(S::Error(m.clone())),
            (S::Loading, E::ProjectChosen) => Some(S::Loading),
            (S::Loading, E::OpenSettings) => Some(S::Settings),
            (S::Loaded, E::Refresh) | (S::Loaded, E::ProjectChosen) => Some(S::Loading),
            (S::Loaded, E::OpenSettings) => Some(S::Settings),
            (S::Loaded, E::SaveStarted) => Some(S::Saving),
            (S::Saving, E::SaveFinished) => Some(S::Loaded),
            (S::Error(_), E::Retry) | (S::Error(_), E::Refresh) | (S::Error(_), E::ProjectChosen) => {
                Some(S::Loading)
            }
            (S::Error(_), E::OpenSettings) => Some(S::Settings),
            _ => None,
        }
    }

    #[test]
    fn transition_table_is_exhaustive() {
        for state in all_states() {
            for event in all_events() {
                assert_eq!(
                    state.on(&event),
                    expected(&state, &event),
                    "{} on {:?}",
                    state.name(),
                    event
                );
            }
        }
    }

    #[test]
    fn saving_ignores_refresh_and_project_switch() {
        assert_eq!(ViewState::Saving.on(&ViewEvent::Refresh), None);
        assert_eq!(ViewState::Saving.on(&ViewEvent::ProjectChosen), None);
        assert_eq!(ViewState::Saving.on(&ViewEvent::SaveStarted), None);
        assert_eq!(ViewState::Saving.on(&ViewEvent::OpenSettings), None);
    }

    #[test]
    fn load_failure_carries_message() {
        let next = ViewState::Loading
            .on(&ViewEvent::LoadFailed("Unauthorized".into()))
            .unwrap();
        assert_eq!(next, ViewState::Error("Unauthorized".into()));
    }

    #[test]
    fn startup_only_from_init() {
        for state in all_states().into_iter().skip(1) {
            assert_eq!(
                state.on(&ViewEvent::Startup { has_projects: true }),
                None
            );
        }
    }

    #[test]
    fn load_results_outside_loading_are_rejected() {
        for state in [ViewState::Settings, ViewState::Loaded, ViewState::Saving] {
            assert_eq!(state.on(&ViewEvent::LoadSucceeded), None);
            assert_eq!(state.on(&ViewEvent::LoadFailed("x".into())), None);
        }
    }
}
