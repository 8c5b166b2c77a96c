use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use super::components::{render_confirm, render_footer, render_header, render_image_card};

/// Everything one lightbox frame shows.
pub struct LightboxView<'a> {
    pub title: &'a str,
    /// One-based focus and sequence length; `None` for an empty series.
    pub position: Option<(usize, usize)>,
    pub image: Option<ImageCard<'a>>,
    pub editing: bool,
    pub help: Option<&'a str>,
    pub status: &'a str,
    pub status_warning: bool,
    pub confirm: Option<&'a str>,
}

pub struct ImageCard<'a> {
    pub alt: &'a str,
    pub source: String,
    pub scale: f64,
}

pub fn draw(frame: &mut Frame<'_>, view: &LightboxView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], view);
    render_image_card(frame, chunks[1], view.image.as_ref());
    render_footer(frame, chunks[2], view);

    if let Some(prompt) = view.confirm {
        render_confirm(frame, prompt);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    use super::*;

    fn screen(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn render(view: &LightboxView<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("test terminal");
        terminal
            .draw(|frame| draw(frame, view))
            .expect("draw frame");
        screen(terminal.backend().buffer())
    }

    fn base_view() -> LightboxView<'static> {
        LightboxView {
            title: "Born in Thorns",
            position: Some((2, 3)),
            image: Some(ImageCard {
                alt: "Thorned crown",
                source: "https://example.com/crown.jpg".to_string(),
                scale: 1.5,
            }),
            editing: false,
            help: Some("Right/l next image"),
            status: "Ready",
            status_warning: false,
            confirm: None,
        }
    }

    #[test]
    fn shows_title_position_and_image() {
        let text = render(&base_view());
        assert!(text.contains("Born in Thorns"), "title missing:\n{text}");
        assert!(text.contains("2 / 3"), "position missing:\n{text}");
        assert!(text.contains("Thorned crown"), "alt text missing:\n{text}");
        assert!(text.contains("Zoom 150%"), "zoom missing:\n{text}");
        assert!(text.contains("Actions: Right/l next image"));
        assert!(text.contains("Status: Ready"));
        assert!(!text.contains("EDITING"));
    }

    #[test]
    fn marks_edit_mode_and_prompts() {
        let mut view = base_view();
        view.editing = true;
        view.confirm = Some("Delete this image from the series?");
        let text = render(&view);
        assert!(text.contains("EDITING"), "edit badge missing:\n{text}");
        assert!(text.contains("Delete this image"), "prompt missing:\n{text}");
        assert!(text.contains("y confirm"));
    }

    #[test]
    fn empty_series_has_placeholder() {
        let mut view = base_view();
        view.position = None;
        view.image = None;
        let text = render(&view);
        assert!(text.contains("No images"), "placeholder missing:\n{text}");
    }
}
