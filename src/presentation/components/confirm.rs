use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::layout::centered_rect;

const CHOICES: &str = "y confirm • n cancel";

pub fn render_confirm(frame: &mut Frame<'_>, prompt: &str) {
    let text_width = prompt.chars().count().max(CHOICES.chars().count()) as u16;
    let area = centered_rect(frame.area(), text_width.saturating_add(6), 6);
    frame.render_widget(Clear, area);

    let body = Paragraph::new(vec![
        Line::styled(
            prompt.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::styled(CHOICES, Style::default().fg(Color::Yellow)),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title("Confirm")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(body, area);
}
