//! Rendering for gruff.
//!
//! `render` is the single entry point called from `terminal.draw()`. It
//! reads `App` state and draws the active view plus a one-line status
//! bar; no state mutation happens here beyond cursor placement.

pub mod editor;
pub mod markdown;
pub mod picker;

use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, InfoMessage, View};
use crate::session::Phase;
use crate::theme::Theme;
use editor::Editor;
use picker::Picker;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(frame: &mut Frame, app: &mut App) {
    let [body, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    match app.view.clone() {
        View::Tasks => render_picker(frame, body, &app.task_picker, &app.theme),
        View::ReviewOptions => render_picker(frame, body, &app.option_picker, &app.theme),
        View::Commits => match &app.commit_picker {
            Some(picker) => render_picker(frame, body, picker, &app.theme),
            None => render_loading(frame, body, app, "Loading commits..."),
        },
        View::Reviewers => {
            if let Some(picker) = &app.reviewer_picker {
                render_picker(frame, body, picker, &app.theme);
            }
        }
        View::Instructions => {
            if let Some(picker) = &app.instruction_picker {
                render_picker(frame, body, picker, &app.theme);
            }
        }
        View::BranchInput => render_branch_input(frame, body, app),
        View::Review => render_review(frame, body, app),
        View::CommitMessage => render_commit_message(frame, body, app),
        View::PrDescription => render_pr_description(frame, body, app),
        View::Info(message) => render_info(frame, body, &message, &app.theme),
        View::Fatal(message) => render_fatal(frame, body, &message, &app.theme),
    }

    render_status_bar(frame, status, app);

    if app.show_help {
        render_help_overlay(frame, frame.area(), &app.theme);
    }
}

fn render_picker(frame: &mut Frame, area: Rect, picker: &Picker, theme: &Theme) {
    let [title_area, filter_area, list_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            picker.title.clone(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        title_area,
    );

    let filter_line = if picker.filter.is_empty() {
        Line::from(Span::styled("type to filter", Style::default().fg(theme.subtext)))
    } else {
        Line::from(vec![
            Span::styled("filter: ", Style::default().fg(theme.subtext)),
            Span::styled(picker.filter.clone(), Style::default().fg(theme.text)),
        ])
    };
    frame.render_widget(Paragraph::new(filter_line), filter_area);

    let filtered = picker.filtered();
    let items: Vec<ListItem> = filtered
        .iter()
        .map(|&idx| ListItem::new(picker.items()[idx].clone()))
        .collect();
    let mut state = ListState::default();
    if !filtered.is_empty() {
        state.select(Some(picker.cursor()));
    }
    let list = List::new(items)
        .highlight_symbol("› ")
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(list, list_area, &mut state);
}

fn render_loading(frame: &mut Frame, area: Rect, app: &App, caption: &str) {
    let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
    let message = if app.loading_message.is_empty() {
        caption.to_owned()
    } else {
        app.loading_message.clone()
    };
    let lines = vec![
        Line::default(),
        Line::from(vec![
            Span::styled(format!("{spinner} "), Style::default().fg(app.theme.primary)),
            Span::styled(message, Style::default().fg(app.theme.primary)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_branch_input(frame: &mut Frame, area: Rect, app: &App) {
    let [title_area, input_area, hint_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Which branch should the changes be compared against?",
            Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
        )),
        title_area,
    );

    let text = app.branch_editor.text();
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(app.theme.accent)),
            Span::styled(text, Style::default().fg(app.theme.text)),
        ])),
        input_area,
    );
    let (_, col) = app.branch_editor.cursor();
    frame.set_cursor_position(Position::new(input_area.x + 2 + col as u16, input_area.y));

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Enter to confirm · Esc to go back",
            Style::default().fg(app.theme.subtext),
        )),
        hint_area,
    );
}

fn render_review(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(session) = &app.review else {
        render_loading(frame, area, app, "Preparing the review...");
        return;
    };

    if app.editing_prompt {
        if let Some(editor) = &app.editor {
            render_editor(frame, area, editor, "Prompt (Esc to save)", &app.theme);
        }
        return;
    }

    match &session.phase {
        Phase::Pending => render_loading(frame, area, app, "Waiting for the first words..."),
        Phase::Errored(message) => {
            let lines = vec![
                Line::from(Span::styled(
                    "The review failed",
                    Style::default().fg(app.theme.error).add_modifier(Modifier::BOLD),
                )),
                Line::default(),
                Line::from(Span::styled(message.clone(), Style::default().fg(app.theme.text))),
                Line::default(),
                Line::from(Span::styled(
                    "r to retry · q to quit",
                    Style::default().fg(app.theme.subtext),
                )),
            ];
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
        }
        Phase::Streaming | Phase::Complete | Phase::Canceled => {
            let text = session.text();
            let paragraph = if session.show_raw {
                Paragraph::new(Text::raw(text))
            } else {
                Paragraph::new(markdown::render(&text, &app.theme))
            };
            frame.render_widget(
                paragraph.wrap(Wrap { trim: false }).scroll((session.scroll, 0)),
                area,
            );
        }
    }
}

fn render_commit_message(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = &app.operation else {
        render_loading(frame, area, app, "Inspecting your changes...");
        return;
    };

    match &session.phase {
        Phase::Pending | Phase::Streaming => {
            render_loading(frame, area, app, "Generating a commit message...");
        }
        Phase::Errored(message) => render_operation_error(frame, area, message, &app.theme),
        _ => {
            let title = if app.editing_prompt {
                "Prompt (Tab to go back)"
            } else {
                "Commit message"
            };
            if let Some(editor) = &app.editor {
                render_editor(frame, area, editor, title, &app.theme);
            }
        }
    }
}

fn render_pr_description(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = &app.operation else {
        render_loading(frame, area, app, "Sizing up the branch...");
        return;
    };

    if app.editing_prompt {
        if let Some(editor) = &app.editor {
            render_editor(frame, area, editor, "Prompt (Tab to go back)", &app.theme);
        }
        return;
    }

    match &session.phase {
        Phase::Pending | Phase::Streaming => {
            render_loading(frame, area, app, "Generating the PR description...");
        }
        Phase::Errored(message) => render_operation_error(frame, area, message, &app.theme),
        _ => {
            let paragraph = Paragraph::new(markdown::render(&session.output, &app.theme))
                .wrap(Wrap { trim: false })
                .scroll((session.scroll, 0));
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_operation_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let lines = vec![
        Line::from(Span::styled(
            "Generation failed",
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(message.to_owned(), Style::default().fg(theme.text))),
        Line::default(),
        Line::from(Span::styled(
            "Ctrl+R / r to retry · Esc to quit",
            Style::default().fg(theme.subtext),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_editor(frame: &mut Frame, area: Rect, editor: &Editor, title: &str, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title.to_owned(), Style::default().fg(theme.accent)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = editor
        .lines()
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(theme.text))))
        .collect();

    // Keep the cursor row visible.
    let (row, col) = editor.cursor();
    let height = inner.height as usize;
    let scroll = if height == 0 { 0 } else { row.saturating_sub(height - 1) };
    frame.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), inner);
    frame.set_cursor_position(Position::new(
        inner.x + col as u16,
        inner.y + (row - scroll) as u16,
    ));
}

fn render_info(frame: &mut Frame, area: Rect, message: &InfoMessage, theme: &Theme) {
    let mut lines = vec![
        Line::from(Span::styled(
            message.title.clone(),
            Style::default().fg(theme.info).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    for body_line in message.body.split('\n') {
        lines.push(Line::from(Span::styled(
            body_line.to_owned(),
            Style::default().fg(theme.text),
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Esc to go back · q to quit",
        Style::default().fg(theme.subtext),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_fatal(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let lines = vec![
        Line::from(Span::styled(
            "Something went wrong",
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(message.to_owned(), Style::default().fg(theme.text))),
        Line::default(),
        Line::from(Span::styled(
            "press any key to exit",
            Style::default().fg(theme.subtext),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let style = Style::default().fg(app.theme.status_bar_fg).bg(app.theme.status_bar_bg);

    let text = match &app.view {
        View::Review => match &app.review {
            Some(session) if session.is_running() => {
                format!(" {} is typing…", session.reviewer)
            }
            Some(session) if session.phase == Phase::Complete => format!(
                " {} is done reviewing · Tab raw/rendered · p prompt · r retry · c/C commit · ? help · q quit",
                session.reviewer
            ),
            _ => " r retry · c/C commit · ? help · q quit".to_owned(),
        },
        View::CommitMessage => {
            " Ctrl+S commit · Tab prompt · Ctrl+R retry · Esc quit".to_owned()
        }
        View::PrDescription => " Tab prompt · r retry · q quit".to_owned(),
        View::BranchInput => " Enter confirm · Esc back".to_owned(),
        View::Tasks | View::ReviewOptions | View::Commits | View::Reviewers => {
            " ↑/↓ navigate · Enter select · Esc back".to_owned()
        }
        View::Instructions => " ↑/↓ navigate · Enter select · x skip · Esc back".to_owned(),
        View::Info(_) | View::Fatal(_) => String::new(),
    };

    let bar = Paragraph::new(Span::styled(text, style)).style(style);
    frame.render_widget(bar, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let width = 46.min(area.width);
    let height = 12.min(area.height);
    let overlay = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Keys ", Style::default().fg(theme.accent)));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let entry = |keys: &str, what: &str| {
        Line::from(vec![
            Span::styled(format!(" {keys:<10}"), Style::default().fg(theme.accent)),
            Span::styled(what.to_owned(), Style::default().fg(theme.text)),
        ])
    };
    let lines = vec![
        entry("Tab", "toggle raw / rendered"),
        entry("p", "view and edit the prompt"),
        entry("r", "retry with the same prompt"),
        entry("c / C", "commit message (staged / all)"),
        entry("↑ ↓", "scroll"),
        entry("Esc", "cancel a running review"),
        entry("q", "quit"),
        entry("?", "close this help"),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
