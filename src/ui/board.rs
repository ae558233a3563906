// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Button board: shared lit state and the radial layout.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::{Arc, Mutex};

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::game::NoteSurface;

/// Button size in terminal cells
pub const BUTTON_WIDTH: u16 = 8;
pub const BUTTON_HEIGHT: u16 = 3;

/// Lit flags shared between the engine and the renderer
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    lit: Arc<Mutex<Vec<bool>>>,
}

impl BoardState {
    /// Create a board with `count` unlit buttons
    pub fn new(count: usize) -> Self {
        Self {
            lit: Arc::new(Mutex::new(vec![false; count])),
        }
    }

    /// Change the number of buttons, clearing every lit flag
    pub fn resize(&self, count: usize) {
        if let Ok(mut lit) = self.lit.lock() {
            lit.clear();
            lit.resize(count, false);
        }
    }

    /// Number of buttons
    pub fn len(&self) -> usize {
        self.lit.lock().map(|lit| lit.len()).unwrap_or(0)
    }

    /// Check if the board has no buttons
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a button is lit
    pub fn is_lit(&self, note: usize) -> bool {
        self.lit
            .lock()
            .map(|lit| lit.get(note).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    /// Copy of every lit flag, for drawing
    pub fn snapshot(&self) -> Vec<bool> {
        self.lit.lock().map(|lit| lit.clone()).unwrap_or_default()
    }
}

impl NoteSurface for BoardState {
    fn set_active(&mut self, note: usize, active: bool) {
        if let Ok(mut lit) = self.lit.lock() {
            if let Some(flag) = lit.get_mut(note) {
                *flag = active;
            }
        }
    }
}

/// Place `count` buttons on an ellipse inscribed in `area`, clockwise from
/// the top. Empty when the area cannot hold a single button.
pub fn button_rects(count: usize, area: Rect) -> Vec<Rect> {
    if count == 0 || area.width < BUTTON_WIDTH || area.height < BUTTON_HEIGHT {
        return Vec::new();
    }

    let cx = area.x as f64 + area.width as f64 / 2.0;
    let cy = area.y as f64 + area.height as f64 / 2.0;
    let rx = (area.width - BUTTON_WIDTH) as f64 / 2.0;
    let ry = (area.height - BUTTON_HEIGHT) as f64 / 2.0;
    let max_x = area.right() - BUTTON_WIDTH;
    let max_y = area.bottom() - BUTTON_HEIGHT;

    (0..count)
        .map(|index| {
            let angle = -FRAC_PI_2 + TAU * index as f64 / count as f64;
            let x = cx + rx * angle.cos() - BUTTON_WIDTH as f64 / 2.0;
            let y = cy + ry * angle.sin() - BUTTON_HEIGHT as f64 / 2.0;
            Rect::new(
                (x.round().max(0.0) as u16).clamp(area.x, max_x),
                (y.round().max(0.0) as u16).clamp(area.y, max_y),
                BUTTON_WIDTH,
                BUTTON_HEIGHT,
            )
        })
        .collect()
}

/// Button under a terminal cell, if any
pub fn button_at(rects: &[Rect], column: u16, row: u16) -> Option<usize> {
    rects.iter().position(|rect| {
        column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
    })
}

/// Draw the board into `area`; returns where each button landed
pub fn render_board(
    frame: &mut Frame,
    area: Rect,
    lit: &[bool],
    colors: &[Color],
    caption: &str,
) -> Vec<Rect> {
    let block = Block::default().borders(Borders::ALL).title(" Simon ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rects = button_rects(lit.len(), inner);
    for (index, rect) in rects.iter().enumerate() {
        let color = colors.get(index).copied().unwrap_or(Color::Gray);
        let (block_style, label_style) = if lit[index] {
            (
                Style::default().fg(color).bg(color),
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                Style::default().fg(color),
                Style::default().fg(color).add_modifier(Modifier::DIM),
            )
        };

        let button = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .style(block_style);
        let label = Paragraph::new(format!("{}", index + 1))
            .alignment(Alignment::Center)
            .style(label_style);

        let label_area = button.inner(*rect);
        frame.render_widget(button, *rect);
        frame.render_widget(label, label_area);
    }

    if inner.height > 0 {
        let caption_area = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        frame.render_widget(
            Paragraph::new(caption)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            caption_area,
        );
    }

    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_shares_state() {
        let board = BoardState::new(4);
        let mut surface: Box<dyn NoteSurface> = Box::new(board.clone());

        surface.set_active(2, true);
        assert!(board.is_lit(2));
        assert_eq!(board.snapshot(), vec![false, false, true, false]);

        surface.set_active(2, false);
        assert!(!board.is_lit(2));
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut board = BoardState::new(2);
        board.set_active(5, true);
        assert_eq!(board.snapshot(), vec![false, false]);
        assert!(!board.is_lit(5));
    }

    #[test]
    fn test_resize_clears() {
        let mut board = BoardState::new(2);
        board.set_active(0, true);
        board.resize(5);
        assert_eq!(board.len(), 5);
        assert!(board.snapshot().iter().all(|lit| !lit));
    }

    #[test]
    fn test_radial_layout() {
        let area = Rect::new(0, 0, 40, 20);
        let rects = button_rects(4, area);
        assert_eq!(rects.len(), 4);

        // Clockwise from the top
        assert_eq!(rects[0].y, 0);
        assert_eq!(rects[0].x, 16);
        assert_eq!(rects[1].right(), 40);
        assert_eq!(rects[2].bottom(), 20);
        assert_eq!(rects[3].x, 0);

        for rect in &rects {
            assert!(rect.x >= area.x && rect.right() <= area.right());
            assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
        }
    }

    #[test]
    fn test_layout_too_small() {
        assert!(button_rects(4, Rect::new(0, 0, 4, 2)).is_empty());
        assert!(button_rects(0, Rect::new(0, 0, 40, 20)).is_empty());
    }

    #[test]
    fn test_button_at() {
        let rects = button_rects(4, Rect::new(0, 0, 40, 20));
        assert_eq!(button_at(&rects, 17, 1), Some(0));
        assert_eq!(button_at(&rects, 20, 10), None);
    }
}
