/// Keyboard selection over the visible result list.
///
/// The cursor is clamped to `[0, len - 1]`; it never wraps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultCursor {
    len: usize,
    selected: Option<usize>,
    panel_visible: bool,
}

impl ResultCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// New result list: selection is cleared, the panel shows if non-empty.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.selected = None;
        self.panel_visible = len > 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn down(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.panel_visible = true;
        let next = match self.selected {
            None => 0,
            Some(i) => (i + 1).min(self.len - 1),
        };
        self.selected = Some(next);
        self.selected
    }

    pub fn up(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.panel_visible = true;
        let next = match self.selected {
            None => 0,
            Some(i) => i.saturating_sub(1),
        };
        self.selected = Some(next);
        self.selected
    }

    /// Index to open: the explicit selection, else the first result.
    pub fn enter(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        Some(self.selected.unwrap_or(0))
    }

    /// Hides the panel; the result list and query are kept.
    pub fn escape(&mut self) {
        self.panel_visible = false;
    }

    pub fn hide(&mut self) {
        self.panel_visible = false;
    }
}
