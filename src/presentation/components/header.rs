use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::super::view::LightboxView;

pub fn render_header(frame: &mut Frame<'_>, area: Rect, view: &LightboxView<'_>) {
    let mut spans = vec![Span::styled(
        view.title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    let counter = match view.position {
        Some((current, total)) => format!("  {current} / {total}"),
        None => "  0 / 0".to_string(),
    };
    spans.push(Span::styled(counter, Style::default().fg(Color::DarkGray)));
    if view.editing {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            " EDITING ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}
