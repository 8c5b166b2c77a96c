use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::super::view::LightboxView;

pub fn render_footer(frame: &mut Frame<'_>, area: Rect, view: &LightboxView<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let actions = view.help.unwrap_or(" ");
    let actions_widget = Paragraph::new(format!("Actions: {actions}"))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(actions_widget, rows[0]);

    let status = if view.status.trim().is_empty() {
        "Ready"
    } else {
        view.status
    };
    let badge = if view.status_warning {
        Span::styled("[!]", Style::default().fg(Color::Red).bg(Color::Black))
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    };
    let status_widget = Paragraph::new(Line::from(vec![
        Span::raw("Status: "),
        Span::raw(status.to_string()),
        Span::raw(" "),
        badge,
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(status_widget, rows[1]);
}
