//! A filterable list picker.
//!
//! Pure state plus key handling; rendering lives in `ui::render`. Typing
//! narrows the list with a case-insensitive substring filter, Enter
//! selects, Esc first clears the filter and then dismisses.

use crossterm::event::{KeyCode, KeyEvent};

/// What a key press did to the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    /// Index into the *original* item list.
    Selected(usize),
    /// Esc with an empty filter — the caller decides where back goes.
    Dismissed,
    /// Navigation or filtering; nothing to act on yet.
    Pending,
}

pub struct Picker {
    pub title: String,
    items: Vec<String>,
    pub filter: String,
    /// Cursor position within the filtered view.
    cursor: usize,
}

impl Picker {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self { title: title.into(), items, filter: String::new(), cursor: 0 }
    }

    /// Indices of items matching the current filter, in listing order.
    pub fn filtered(&self) -> Vec<usize> {
        let needle = self.filter.to_lowercase();
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.to_lowercase().contains(&needle))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Cursor position within the filtered view, clamped.
    pub fn cursor(&self) -> usize {
        let len = self.filtered().len();
        if len == 0 { 0 } else { self.cursor.min(len - 1) }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerOutcome {
        let filtered = self.filtered();
        match key.code {
            KeyCode::Up => {
                self.cursor = self.cursor().saturating_sub(1);
                PickerOutcome::Pending
            }
            KeyCode::Down => {
                if !filtered.is_empty() {
                    self.cursor = (self.cursor() + 1).min(filtered.len() - 1);
                }
                PickerOutcome::Pending
            }
            KeyCode::Enter => match filtered.get(self.cursor()) {
                Some(&original) => PickerOutcome::Selected(original),
                None => PickerOutcome::Pending,
            },
            KeyCode::Esc => {
                if self.filter.is_empty() {
                    PickerOutcome::Dismissed
                } else {
                    self.filter.clear();
                    self.cursor = 0;
                    PickerOutcome::Pending
                }
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.cursor = 0;
                PickerOutcome::Pending
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.cursor = 0;
                PickerOutcome::Pending
            }
            _ => PickerOutcome::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn picker() -> Picker {
        Picker::new(
            "Reviewers",
            vec!["Linus".into(), "Linus Jr".into(), "The Bard".into()],
        )
    }

    #[test]
    fn typing_filters_case_insensitively() {
        let mut p = picker();
        p.handle_key(key(KeyCode::Char('l')));
        p.handle_key(key(KeyCode::Char('i')));
        assert_eq!(p.filtered(), vec![0, 1]);
    }

    #[test]
    fn enter_selects_original_index() {
        let mut p = picker();
        for c in "bard".chars() {
            p.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(p.handle_key(key(KeyCode::Enter)), PickerOutcome::Selected(2));
    }

    #[test]
    fn esc_clears_filter_before_dismissing() {
        let mut p = picker();
        p.handle_key(key(KeyCode::Char('z')));
        assert_eq!(p.handle_key(key(KeyCode::Esc)), PickerOutcome::Pending);
        assert!(p.filter.is_empty());
        assert_eq!(p.handle_key(key(KeyCode::Esc)), PickerOutcome::Dismissed);
    }

    #[test]
    fn enter_on_empty_filter_result_is_a_no_op() {
        let mut p = picker();
        for c in "nomatch".chars() {
            p.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(p.handle_key(key(KeyCode::Enter)), PickerOutcome::Pending);
    }

    #[test]
    fn cursor_stays_in_bounds_after_filtering() {
        let mut p = picker();
        p.handle_key(key(KeyCode::Down));
        p.handle_key(key(KeyCode::Down));
        assert_eq!(p.cursor(), 2);
        p.handle_key(key(KeyCode::Char('b')));
        assert_eq!(p.cursor(), 0);
    }
}
