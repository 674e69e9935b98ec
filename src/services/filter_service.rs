use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::debug;

use crate::models::filter::{FilterKind, FilterOption};
use crate::services::api_client::ApiClient;

/// Search kicks in only once a dropdown holds more entries than this.
pub const SEARCH_THRESHOLD: usize = 5;

/// What a dropdown renders: the option list, or a loading placeholder, or a
/// human-readable error entry. Never all three at once, never a panic.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSnapshot {
    pub options: Vec<FilterOption>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct ProviderState {
    options: Vec<FilterOption>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl ProviderState {
    fn snapshot(&self) -> ProviderSnapshot {
        ProviderSnapshot {
            options: self.options.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

/// One option-list provider per filter kind. Each load bumps the kind's
/// generation before suspending; a response carrying a stale generation is
/// discarded, which doubles as the unmount guard (`release` bumps the
/// generation so a torn-down dropdown's in-flight fetch cannot write state).
pub struct FilterService {
    client: Arc<ApiClient>,
    states: RwLock<HashMap<FilterKind, ProviderState>>,
}

impl FilterService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            states: RwLock::new(HashMap::new()),
        }
    }

    pub async fn load(&self, kind: FilterKind) -> ProviderSnapshot {
        let generation = {
            let mut states = self.states.write().expect("filter state lock poisoned");
            let state = states.entry(kind).or_default();
            state.generation += 1;
            state.loading = true;
            state.error = None;
            state.generation
        };

        let result = self.client.fetch_index(kind).await;

        let mut states = self.states.write().expect("filter state lock poisoned");
        let state = states.entry(kind).or_default();
        if state.generation != generation {
            debug!(target: "app::filters", kind = %kind, "stale option response discarded");
            return state.snapshot();
        }

        match result {
            Ok(options) => {
                debug!(target: "app::filters", kind = %kind, count = options.len(), "options loaded");
                state.options = options;
                state.error = None;
            }
            Err(error) => {
                state.options = Vec::new();
                state.error = Some(error.to_string());
            }
        }
        state.loading = false;
        state.snapshot()
    }

    /// Unmount guard: in-flight responses for this kind are discarded from
    /// here on. The network call itself is not aborted.
    pub fn release(&self, kind: FilterKind) {
        let mut states = self.states.write().expect("filter state lock poisoned");
        let state = states.entry(kind).or_default();
        state.generation += 1;
        state.loading = false;
    }

    pub fn snapshot(&self, kind: FilterKind) -> ProviderSnapshot {
        let states = self.states.read().expect("filter state lock poisoned");
        states
            .get(&kind)
            .map(ProviderState::snapshot)
            .unwrap_or_default()
    }
}

/// Local dropdown state: the chosen option plus in-progress search text.
/// Selection never triggers an aggregate fetch by itself.
#[derive(Debug, Default, Clone)]
pub struct FilterSelector {
    selected: Option<FilterOption>,
    search: String,
}

impl FilterSelector {
    pub fn selected(&self) -> Option<&FilterOption> {
        self.selected.as_ref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn searchable(options: &[FilterOption]) -> bool {
        options.len() > SEARCH_THRESHOLD
    }

    /// Case-insensitive substring filter over id and name. Applied only when
    /// the list is large enough to warrant the search box.
    pub fn visible<'a>(&self, options: &'a [FilterOption]) -> Vec<&'a FilterOption> {
        let query = self.search.trim().to_lowercase();
        if query.is_empty() || !Self::searchable(options) {
            return options.iter().collect();
        }

        options
            .iter()
            .filter(|option| {
                option.id.to_lowercase().contains(&query)
                    || option.name.as_text().to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Resolves the picked id against the full option list and records it.
    /// Unknown ids clear the selection, mirroring a dropdown that no longer
    /// shows the entry.
    pub fn select(&mut self, options: &[FilterOption], id: &str) -> Option<FilterOption> {
        self.selected = options.iter().find(|option| option.id == id).cloned();
        self.selected.clone()
    }

    /// Explicit clear: drops the selection and resets any search text.
    pub fn clear(&mut self) {
        self.selected = None;
        self.search.clear();
    }
}
