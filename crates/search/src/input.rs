use foundation::time::Millis;
use runtime::debounce::Debouncer;
use scene::entity::MapEntity;

use crate::navigation::ResultCursor;
use crate::ranker::{SearchOptions, SearchResult, rank};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchKey {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Selection cursor moved to this index.
    Moved(usize),
    /// A result was chosen.
    Selected(SearchResult),
    PanelHidden,
    Ignored,
}

/// Search-as-you-type state: query text, debounce timer, ranked results
/// and the keyboard cursor over them.
#[derive(Debug, Clone)]
pub struct SearchBox {
    query: String,
    debouncer: Debouncer<String>,
    results: Vec<SearchResult>,
    cursor: ResultCursor,
    options: SearchOptions,
}

impl SearchBox {
    pub fn new(debounce_ms: u64, options: SearchOptions) -> Self {
        Self {
            query: String::new(),
            debouncer: Debouncer::new(debounce_ms),
            results: Vec::new(),
            cursor: ResultCursor::new(),
            options,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn cursor(&self) -> &ResultCursor {
        &self.cursor
    }

    pub fn panel_visible(&self) -> bool {
        self.cursor.panel_visible()
    }

    pub fn pending_deadline(&self) -> Option<Millis> {
        self.debouncer.deadline()
    }

    /// Records a keystroke. A blank query clears results immediately.
    pub fn input(&mut self, now: Millis, text: &str) {
        self.query = text.to_string();
        if text.trim().is_empty() {
            self.debouncer.cancel();
            self.set_results(Vec::new());
            return;
        }
        self.debouncer.push(now, self.query.clone());
    }

    /// Runs the debounced search if its idle window has elapsed.
    ///
    /// Returns the new result count when a search ran.
    pub fn poll<'a>(
        &mut self,
        now: Millis,
        entities: impl IntoIterator<Item = &'a MapEntity>,
    ) -> Option<usize> {
        let query = self.debouncer.poll(now)?;
        self.set_results(rank(entities, &query, &self.options));
        Some(self.results.len())
    }

    /// Searches the current query immediately, dropping any pending timer.
    pub fn search_now<'a>(
        &mut self,
        entities: impl IntoIterator<Item = &'a MapEntity>,
    ) -> &[SearchResult] {
        self.debouncer.cancel();
        let results = rank(entities, &self.query, &self.options);
        self.set_results(results);
        &self.results
    }

    pub fn key(&mut self, key: SearchKey) -> KeyOutcome {
        match key {
            SearchKey::Down => self.cursor.down().map_or(KeyOutcome::Ignored, KeyOutcome::Moved),
            SearchKey::Up => self.cursor.up().map_or(KeyOutcome::Ignored, KeyOutcome::Moved),
            SearchKey::Enter => self.choose_index(self.cursor.enter()),
            SearchKey::Escape => {
                self.cursor.escape();
                KeyOutcome::PanelHidden
            }
        }
    }

    /// Picks a result by index, e.g. from a click in the result panel.
    pub fn choose(&mut self, index: usize) -> KeyOutcome {
        self.choose_index(Some(index))
    }

    fn choose_index(&mut self, index: Option<usize>) -> KeyOutcome {
        let Some(result) = index.and_then(|i| self.results.get(i)).cloned() else {
            return KeyOutcome::Ignored;
        };
        self.cursor.hide();
        KeyOutcome::Selected(result)
    }

    fn set_results(&mut self, results: Vec<SearchResult>) {
        self.cursor.reset(results.len());
        self.results = results;
    }
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS, SearchOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyOutcome, SearchBox, SearchKey};
    use foundation::geo::LonLat;
    use foundation::time::Millis;
    use scene::entity::{EntityId, EntityKind, MapEntity};

    fn campus() -> Vec<MapEntity> {
        ["Main Building", "Science Center", "Library", "Student Center"]
            .iter()
            .enumerate()
            .map(|(i, n)| {
                MapEntity::new(
                    EntityId::new(EntityKind::Building, i.to_string()),
                    *n,
                    LonLat::new(-118.14, 34.05).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn typing_searches_only_after_idle_window() {
        let world = campus();
        let mut sb = SearchBox::default();
        sb.input(Millis(0), "c");
        sb.input(Millis(100), "ce");
        sb.input(Millis(200), "cen");
        assert_eq!(sb.poll(Millis(400), &world), None);
        assert_eq!(sb.poll(Millis(500), &world), Some(2));
        assert!(sb.panel_visible());
        assert_eq!(sb.poll(Millis(900), &world), None);
    }

    #[test]
    fn blank_query_hides_panel_and_cancels_pending() {
        let world = campus();
        let mut sb = SearchBox::default();
        sb.input(Millis(0), "lib");
        sb.poll(Millis(300), &world);
        assert_eq!(sb.results().len(), 1);
        sb.input(Millis(400), "lib2");
        sb.input(Millis(450), "");
        assert!(sb.results().is_empty());
        assert!(!sb.panel_visible());
        assert_eq!(sb.poll(Millis(10_000), &world), None);
    }

    #[test]
    fn enter_selects_first_and_escape_keeps_query() {
        let world = campus();
        let mut sb = SearchBox::default();
        sb.input(Millis(0), "center");
        sb.poll(Millis(300), &world);

        assert_eq!(sb.key(SearchKey::Escape), KeyOutcome::PanelHidden);
        assert_eq!(sb.query(), "center");
        assert_eq!(sb.results().len(), 2);

        match sb.key(SearchKey::Enter) {
            KeyOutcome::Selected(r) => assert_eq!(r.entity.name, "Science Center"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn arrows_then_enter_select_that_row() {
        let world = campus();
        let mut sb = SearchBox::default();
        sb.input(Millis(0), "center");
        sb.search_now(&world);
        assert_eq!(sb.key(SearchKey::Down), KeyOutcome::Moved(0));
        assert_eq!(sb.key(SearchKey::Down), KeyOutcome::Moved(1));
        assert_eq!(sb.key(SearchKey::Down), KeyOutcome::Moved(1));
        match sb.key(SearchKey::Enter) {
            KeyOutcome::Selected(r) => assert_eq!(r.entity.name, "Student Center"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!sb.panel_visible());
    }

    #[test]
    fn keys_without_results_are_ignored() {
        let mut sb = SearchBox::default();
        assert_eq!(sb.key(SearchKey::Down), KeyOutcome::Ignored);
        assert_eq!(sb.key(SearchKey::Enter), KeyOutcome::Ignored);
    }
}
