// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the game.
//!
//! Provides a ratatui-based terminal interface with the radial button
//! board, a level / high score header and a help overlay. Buttons are
//! played with the digit keys or a mouse click.

mod board;
pub mod palette;

pub use board::{button_at, button_rects, render_board, BoardState, BUTTON_HEIGHT, BUTTON_WIDTH};

use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::control::{format_shortcut, ControlAction, KeyboardController};
use crate::session::Session;

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// UI-only state
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }
}

/// Terminal UI application
pub struct App {
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    keyboard: KeyboardController,
    state: UiState,
    /// One color per button
    colors: Vec<Color>,
    /// Where each button was last drawn, for mouse hits
    buttons: Vec<Rect>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
}

impl App {
    /// Take over the terminal
    pub fn new() -> io::Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            keyboard: KeyboardController::with_defaults(0),
            state: UiState::default(),
            colors: Vec::new(),
            buttons: Vec::new(),
            frame_rate: 60,
            running: true,
        })
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Run the event loop until the player quits.
    ///
    /// Game time follows the wall clock: each pass advances the session by
    /// the real time elapsed since the previous one.
    pub fn run(&mut self, session: &mut Session) -> io::Result<()> {
        self.sync_buttons(session);
        let mut last_tick = Instant::now();

        while self.running {
            if let Some(event) = self.poll_event(session)? {
                self.handle_event(event, session);
            }

            let now = Instant::now();
            session.advance(now - last_tick);
            last_tick = now;

            if let Some(message) = session.take_status() {
                self.state.set_status(message);
            }
            self.state.clear_expired_status();
            self.sync_buttons(session);

            self.draw(session)?;
        }

        Ok(())
    }

    /// Poll for events, waking early when the game has work due
    fn poll_event(&self, session: &Session) -> io::Result<Option<Event>> {
        let mut timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if let Some(due) = session.time_to_next_event() {
            timeout = timeout.min(due);
        }
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    fn handle_event(&mut self, event: Event, session: &mut Session) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let action = self.keyboard.process_key(key.code, key.modifiers);
                self.apply(action, session);
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if let Some(note) = button_at(&self.buttons, mouse.column, mouse.row) {
                    self.apply(ControlAction::HitNote(note), session);
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, action: ControlAction, session: &mut Session) {
        match action {
            ControlAction::None => {}
            ControlAction::Quit => self.quit(),
            ControlAction::ToggleHelp => self.state.show_help = !self.state.show_help,
            action => session.handle(action),
        }
    }

    /// Follow button count changes with new colors and digit bindings
    fn sync_buttons(&mut self, session: &Session) {
        let count = session.number_of_notes();
        if self.colors.len() != count {
            self.colors = palette::button_colors(count, session.colors());
            self.keyboard.set_note_count(count);
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, session: &Session) -> io::Result<()> {
        let state = &self.state;
        let keyboard = &self.keyboard;
        let colors = &self.colors;
        let lit = session.board().snapshot();
        let mut buttons = Vec::new();

        self.terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: header, board, status bar
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Min(9),    // Board
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            render_header(frame, chunks[0], session);

            let caption = if session.level() > 0 {
                format!("Level {}", session.level())
            } else {
                "Press S to start".to_string()
            };
            buttons = render_board(frame, chunks[1], &lit, colors, &caption);

            render_status_bar(frame, chunks[2], state);

            if state.show_help {
                render_help_overlay(frame, area, keyboard);
            }
        })?;

        self.buttons = buttons;
        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render level, high score and tone settings
fn render_header(frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = Style::default().fg(Color::DarkGray);
    let line = Line::from(vec![
        Span::styled(" Level ", label),
        Span::styled(
            format!("{:<4}", session.level()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" High ", label),
        Span::styled(
            format!("{:<4}", session.high_score()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" Buttons ", label),
        Span::styled(
            format!("{:<4}", session.number_of_notes()),
            Style::default().fg(Color::White),
        ),
        Span::styled(" Volume ", label),
        Span::styled(
            format!("{:>3.0}% ", session.volume() * 100.0),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(" Tone ", label),
        Span::styled(session.timbre().name(), Style::default().fg(Color::Green)),
    ]);

    frame.render_widget(Paragraph::new(line), inner);
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg, Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " s: Start | r: Reset | 1-9/click: Play | +/-: Volume | [/]: Buttons | h: Help | q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Help lines for one binding category, shortcuts sharing an action merged
fn help_lines(keyboard: &KeyboardController, category: &str) -> Vec<Line<'static>> {
    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(bindings) = keyboard.bindings_by_category().get(category) {
        for binding in bindings {
            merged
                .entry(binding.description.clone())
                .or_default()
                .push(format_shortcut(&binding.shortcut));
        }
    }

    merged
        .into_iter()
        .map(|(description, mut keys)| {
            keys.sort();
            Line::from(format!("  {:<12}{}", keys.join("/"), description))
        })
        .collect()
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, keyboard: &KeyboardController) {
    // Calculate centered area
    let width = 44.min(area.width.saturating_sub(4));
    let height = 20.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
    };

    let mut help_text = vec![heading("Play")];
    if keyboard.note_keys() > 0 {
        help_text.push(Line::from(format!(
            "  {:<12}Play a button",
            format!("1-{}", keyboard.note_keys())
        )));
    }
    help_text.push(Line::from("  Click       Play a button"));
    for (title, category) in [("Game", "Game"), ("Settings", "Settings"), ("Other", "UI")] {
        help_text.push(Line::from(""));
        help_text.push(heading(title));
        help_text.extend(help_lines(keyboard, category));
    }

    frame.render_widget(Paragraph::new(help_text), inner);
}
