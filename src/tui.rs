// Terminal front end for the filter settings form

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::controller::{ConfigController, UiEvent};
use crate::form::{self, Form, Input, InputKind, StatusKind};

const BAR_WIDTH: usize = 24;
const HELP: &str =
    "Up/Down select | Left/Right adjust | type to edit | Ctrl+L/F5 load | Ctrl+S/F2 save | Esc quit";

#[derive(Debug, PartialEq)]
enum KeyAction {
    Quit,
    Focus(isize),
    Dispatch(UiEvent),
    Ignore,
}

fn click(target: &str) -> KeyAction {
    KeyAction::Dispatch(UiEvent::Click(target.to_string()))
}

fn edit(input: &Input, value: String) -> KeyAction {
    KeyAction::Dispatch(UiEvent::Input {
        target: input.id.to_string(),
        value,
    })
}

fn map_key(key: KeyEvent, focused: &Input) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('l') if ctrl => click(form::LOAD_TRIGGER),
        KeyCode::F(5) => click(form::LOAD_TRIGGER),
        KeyCode::Char('s') if ctrl => click(form::SAVE_TRIGGER),
        KeyCode::F(2) => click(form::SAVE_TRIGGER),
        KeyCode::Down | KeyCode::Tab => KeyAction::Focus(1),
        KeyCode::Up | KeyCode::BackTab => KeyAction::Focus(-1),
        KeyCode::Left => focused
            .stepped(-1)
            .map_or(KeyAction::Ignore, |v| edit(focused, v)),
        KeyCode::Right => focused
            .stepped(1)
            .map_or(KeyAction::Ignore, |v| edit(focused, v)),
        KeyCode::Backspace if !focused.is_range() => {
            let mut value = focused.value.clone();
            if value.pop().is_none() {
                return KeyAction::Ignore;
            }
            edit(focused, value)
        }
        KeyCode::Char(c) if !ctrl && !focused.is_range() => {
            let mut value = focused.value.clone();
            value.push(c);
            edit(focused, value)
        }
        _ => KeyAction::Ignore,
    }
}

fn field_line<'a>(form: &'a Form, input: &'a Input, focused: bool) -> Line<'a> {
    let emphasis = if focused {
        Modifier::BOLD
    } else {
        Modifier::empty()
    };
    let marker = if focused { "> " } else { "  " };

    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("{:<18}", input.caption),
            Style::default().fg(Color::Gray).add_modifier(emphasis),
        ),
    ];

    match input.kind {
        InputKind::Range { .. } => {
            let filled = (input.ratio().unwrap_or(0.0) * BAR_WIDTH as f64).round() as usize;
            spans.push(Span::styled(
                "█".repeat(filled),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::styled(
                "░".repeat(BAR_WIDTH - filled),
                Style::default().fg(Color::DarkGray),
            ));
            spans.push(Span::styled(
                format!(" {}", form.label(input.id).unwrap_or_default()),
                Style::default().add_modifier(emphasis),
            ));
        }
        InputKind::Text => {
            let cursor = if focused { "_" } else { "" };
            spans.push(Span::styled(
                format!("[{}{}]", input.value, cursor),
                Style::default().add_modifier(emphasis),
            ));
        }
    }

    Line::from(spans)
}

fn status_color(kind: Option<StatusKind>) -> Color {
    match kind {
        Some(StatusKind::Info) => Color::Cyan,
        Some(StatusKind::Success) => Color::Green,
        Some(StatusKind::Error) => Color::Red,
        None => Color::Reset,
    }
}

fn draw(f: &mut Frame, form: &Form, focus: usize, endpoint: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let header = Paragraph::new(format!("Backend: {}", endpoint)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Filter Configuration"),
    );
    f.render_widget(header, chunks[0]);

    let lines: Vec<Line> = form
        .inputs()
        .iter()
        .enumerate()
        .map(|(i, input)| field_line(form, input, i == focus))
        .collect();
    let fields = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(fields, chunks[1]);

    let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[2]);

    let status = form.status();
    let status_widget = Paragraph::new(status.text.as_str())
        .style(Style::default().fg(status_color(status.kind())))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status_widget, chunks[3]);
}

/// Runs the form until the user quits.
pub fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut ConfigController,
    endpoint: &str,
) -> Result<()> {
    let mut focus = 0usize;
    let mut needs_render = true;

    loop {
        if needs_render {
            terminal.draw(|f| draw(f, controller.form(), focus, endpoint))?;
            needs_render = false;
        }

        // 50ms keeps completions and status clears responsive
        if poll(Duration::from_millis(50))? {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let count = controller.form().inputs().len().max(1) as isize;
                    let action = controller
                        .form()
                        .inputs()
                        .get(focus)
                        .map_or(KeyAction::Ignore, |input| map_key(key, input));

                    match action {
                        KeyAction::Quit => break,
                        KeyAction::Focus(delta) => {
                            focus = (focus as isize + delta).rem_euclid(count) as usize;
                            needs_render = true;
                        }
                        KeyAction::Dispatch(event) => {
                            controller.dispatch(event);
                            needs_render = true;
                        }
                        KeyAction::Ignore => {}
                    }
                }
                Event::Resize(..) => needs_render = true,
                _ => {}
            }
        }

        if controller.drain() > 0 {
            needs_render = true;
        }
    }

    Ok(())
}
