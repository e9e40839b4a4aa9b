//! A minimal multi-line text editor widget.
//!
//! Backs the branch-name input, the editable commit message, and prompt
//! editing. Pure state; `ui::render` draws the lines and places the
//! terminal cursor from [`Editor::cursor`].

use crossterm::event::{KeyCode, KeyEvent};

pub struct Editor {
    lines: Vec<String>,
    row: usize,
    /// Column in characters, not bytes.
    col: usize,
}

impl Editor {
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = if text.is_empty() {
            vec![String::new()]
        } else {
            text.split('\n').map(str::to_owned).collect()
        };
        let row = lines.len() - 1;
        let col = lines[row].chars().count();
        Self { lines, row, col }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// (row, column) of the cursor, in character cells.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn byte_offset(line: &str, col: usize) -> usize {
        line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                let offset = Self::byte_offset(&self.lines[self.row], self.col);
                self.lines[self.row].insert(offset, c);
                self.col += 1;
            }
            KeyCode::Enter => {
                let offset = Self::byte_offset(&self.lines[self.row], self.col);
                let tail = self.lines[self.row].split_off(offset);
                self.lines.insert(self.row + 1, tail);
                self.row += 1;
                self.col = 0;
            }
            KeyCode::Backspace => {
                if self.col > 0 {
                    self.col -= 1;
                    let offset = Self::byte_offset(&self.lines[self.row], self.col);
                    self.lines[self.row].remove(offset);
                } else if self.row > 0 {
                    let removed = self.lines.remove(self.row);
                    self.row -= 1;
                    self.col = self.lines[self.row].chars().count();
                    self.lines[self.row].push_str(&removed);
                }
            }
            KeyCode::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.lines[self.row].chars().count();
                }
            }
            KeyCode::Right => {
                if self.col < self.lines[self.row].chars().count() {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyCode::Up => {
                if self.row > 0 {
                    self.row -= 1;
                    self.col = self.col.min(self.lines[self.row].chars().count());
                }
            }
            KeyCode::Down => {
                if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = self.col.min(self.lines[self.row].chars().count());
                }
            }
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.lines[self.row].chars().count(),
            _ => {}
        }
    }
}
