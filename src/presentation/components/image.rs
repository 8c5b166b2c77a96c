use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{super::view::ImageCard, layout::centered_rect};
use crate::domain::MAX_SCALE;

const MIN_CARD_WIDTH: u16 = 24;
const MIN_CARD_HEIGHT: u16 = 5;

pub fn render_image_card(frame: &mut Frame<'_>, area: Rect, image: Option<&ImageCard<'_>>) {
    let Some(image) = image else {
        let placeholder = Paragraph::new("No images in this series")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(placeholder, area);
        return;
    };

    let card = centered_rect(
        area,
        scaled(area.width, image.scale).max(MIN_CARD_WIDTH),
        scaled(area.height, image.scale).max(MIN_CARD_HEIGHT),
    );
    let lines = vec![
        Line::styled(
            image.alt.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(image.source.clone(), Style::default().fg(Color::Cyan)),
        Line::styled(
            format!("Zoom {:.0}%", image.scale * 100.0),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, card);
}

/// The card fills the area at maximum zoom.
fn scaled(extent: u16, scale: f64) -> u16 {
    let ratio = (scale / MAX_SCALE).clamp(0.0, 1.0);
    (f64::from(extent) * ratio).round() as u16
}
