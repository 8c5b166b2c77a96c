use std::time::Instant;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, MouseEvent};
use serde_json::Value;

use super::{
    input::{InputRouter, LightboxAction},
    keymap::KeymapContext,
    options::BrowserOptions,
    status::StatusLine,
    terminal::TerminalGuard,
};
use crate::{
    domain::FieldPath,
    io::Storage,
    presentation::{self, ImageCard, LightboxView},
    session::{
        EditSession, FixedAnswer, GalleryError, Lightbox, REMOVE_IMAGE_PROMPT, RemoveOutcome,
        WheelGate,
    },
    store,
};

const BROWSING: &[KeymapContext] = &[KeymapContext::Browse];
const EDITING: &[KeymapContext] = &[KeymapContext::Browse, KeymapContext::Edit];
const CONFIRMING: &[KeymapContext] = &[KeymapContext::Confirm];

pub(crate) struct App<S> {
    edit: EditSession<S>,
    lightbox: Lightbox,
    router: InputRouter,
    options: BrowserOptions,
    status: StatusLine,
    pending_removal: Option<usize>,
    should_quit: bool,
}

impl<S: Storage> App<S> {
    pub fn new(
        edit: EditSession<S>,
        array_path: FieldPath,
        start: usize,
        options: BrowserOptions,
    ) -> Result<Self, GalleryError> {
        let mut lightbox = Lightbox::new();
        lightbox.open(edit.document(), array_path, start)?;
        Ok(Self {
            edit,
            lightbox,
            router: InputRouter::new(WheelGate::new(options.wheel_cooldown)),
            options,
            status: StatusLine::new(),
            pending_removal: None,
            should_quit: false,
        })
    }

    pub fn run(mut self) -> Result<EditSession<S>> {
        let mut terminal = TerminalGuard::new()?;
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse, Instant::now()),
                Event::Resize(_, _) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
        drop(terminal);
        Ok(self.into_session())
    }

    pub fn into_session(mut self) -> EditSession<S> {
        self.lightbox.close();
        self.edit
    }

    fn contexts(&self) -> &'static [KeymapContext] {
        if self.pending_removal.is_some() {
            CONFIRMING
        } else if self.edit.is_editing() {
            EDITING
        } else {
            BROWSING
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let keymap = self.options.keymap();
        if let Some(action) = self.router.key(&keymap, &key, self.contexts()) {
            self.handle_command(action);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.pending_removal.is_some() {
            return;
        }
        if let Some(action) = self.router.mouse(&mouse, now) {
            self.handle_command(action);
        }
    }

    pub(crate) fn handle_command(&mut self, action: LightboxAction) {
        if self.pending_removal.is_some()
            && !matches!(action, LightboxAction::Confirm | LightboxAction::Cancel)
        {
            return;
        }
        match action {
            LightboxAction::Step(delta) => self.step(delta),
            LightboxAction::Close => {
                self.router.reset_wheel();
                self.should_quit = true;
            }
            LightboxAction::ToggleEdit => {
                let editing = self.edit.toggle();
                self.status.edit_mode(editing);
            }
            LightboxAction::AddImage => {
                if self.require_edit_mode() {
                    match self.lightbox.add(&mut self.edit) {
                        Ok(save) => self.status.image_added(&save),
                        Err(err) => self.status.warn(err.to_string()),
                    }
                }
            }
            LightboxAction::RemoveImage => {
                if self.require_edit_mode() {
                    self.request_removal();
                }
            }
            LightboxAction::Zoom(steps) => {
                if self.require_edit_mode() {
                    match self.lightbox.zoom(&mut self.edit, steps) {
                        Ok(scale) => self.status.zoomed(scale, self.edit.last_save()),
                        Err(err) => self.status.warn(err.to_string()),
                    }
                }
            }
            LightboxAction::Confirm => {
                if let Some(index) = self.pending_removal.take() {
                    match self
                        .lightbox
                        .remove(&mut self.edit, index, &mut FixedAnswer(true))
                    {
                        Ok(outcome) => self.status.removal(&outcome),
                        Err(err) => self.status.warn(err.to_string()),
                    }
                }
            }
            LightboxAction::Cancel => {
                if self.pending_removal.take().is_some() {
                    self.status.removal(&RemoveOutcome::Declined);
                }
            }
        }
    }

    fn step(&mut self, delta: i32) {
        let doc = self.edit.document();
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                self.lightbox.next(doc);
            } else {
                self.lightbox.prev(doc);
            }
        }
    }

    fn require_edit_mode(&mut self) -> bool {
        if !self.edit.is_editing() {
            self.status.edit_mode_required();
        }
        self.edit.is_editing()
    }

    /// Runs the removal preconditions without deleting, then waits for y/n.
    fn request_removal(&mut self) {
        let Some(index) = self.lightbox.current_index() else {
            return;
        };
        let mut defer = |_: &str| false;
        match self.lightbox.remove(&mut self.edit, index, &mut defer) {
            Ok(RemoveOutcome::Declined) => {
                self.pending_removal = Some(index);
                self.status.awaiting_removal();
            }
            Ok(outcome) => self.status.removal(&outcome),
            Err(err) => self.status.warn(err.to_string()),
        }
    }

    fn title(&self) -> String {
        let Some(session) = self.lightbox.session() else {
            return String::new();
        };
        let array_path = session.array_path();
        array_path
            .parent()
            .and_then(|owner| store::get(self.edit.document(), &owner))
            .and_then(|owner| {
                ["title", "name"]
                    .into_iter()
                    .find_map(|key| owner.get(key).and_then(Value::as_str))
            })
            .map(str::to_string)
            .unwrap_or_else(|| array_path.to_string())
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let doc = self.edit.document();
        let len = self.lightbox.len(doc);
        let entry = self.lightbox.current_entry(doc);
        let title = self.title();
        let help = self
            .options
            .show_help
            .then(|| self.options.keymap.help_text(self.contexts()));

        let view = LightboxView {
            title: &title,
            position: self
                .lightbox
                .current_index()
                .filter(|_| len > 0)
                .map(|index| (index + 1, len)),
            image: entry.as_ref().map(|entry| ImageCard {
                alt: &entry.alt,
                source: entry.source().describe(),
                scale: entry.effective_scale(),
            }),
            editing: self.edit.is_editing(),
            help: help.as_deref(),
            status: self.status.message(),
            status_warning: self.status.is_warning(),
            confirm: self.pending_removal.map(|_| REMOVE_IMAGE_PROMPT),
        };
        presentation::draw(frame, &view);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers, MouseEventKind};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::{field_path, io::MemoryStorage};

    fn series() -> FieldPath {
        field_path!["artSeries", 0usize, "images"]
    }

    fn app() -> App<MemoryStorage> {
        let edit = EditSession::open(MemoryStorage::new());
        App::new(edit, series(), 0, BrowserOptions::default()).expect("open series")
    }

    fn len(app: &App<MemoryStorage>) -> usize {
        app.lightbox.len(app.edit.document())
    }

    fn press(app: &mut App<MemoryStorage>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn keys_step_and_wrap() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.lightbox.current_index(), Some(1));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.lightbox.current_index(), Some(0));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.lightbox.current_index(), Some(1));
    }

    #[test]
    fn edit_actions_need_edit_mode() {
        let mut app = app();
        app.handle_command(LightboxAction::AddImage);
        assert_eq!(len(&app), 2);
        assert!(app.status.is_warning());

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(len(&app), 2, "edit keys are unbound outside edit mode");

        press(&mut app, KeyCode::Char('e'));
        assert!(app.edit.is_editing());
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(len(&app), 3);
        assert_eq!(app.lightbox.current_index(), Some(2));
        assert_eq!(app.status.message(), "Image added");
    }

    #[test]
    fn removal_waits_for_confirmation() {
        let mut app = app();
        app.handle_command(LightboxAction::ToggleEdit);
        app.handle_command(LightboxAction::AddImage);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.pending_removal, Some(2));
        assert_eq!(len(&app), 3, "nothing is deleted before the answer");

        press(&mut app, KeyCode::Right);
        assert_eq!(app.lightbox.current_index(), Some(2), "prompt swallows navigation");

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.pending_removal, None);
        assert_eq!(len(&app), 3);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(len(&app), 2);
        assert_eq!(app.lightbox.current_index(), Some(1));
        assert_eq!(app.status.message(), "Image deleted, 2 left");
    }

    #[test]
    fn last_image_cannot_be_removed() {
        let mut app = app();
        app.handle_command(LightboxAction::ToggleEdit);
        app.handle_command(LightboxAction::RemoveImage);
        app.handle_command(LightboxAction::Confirm);
        assert_eq!(len(&app), 1);

        app.handle_command(LightboxAction::RemoveImage);
        assert_eq!(app.pending_removal, None);
        assert_eq!(app.status.message(), "A series must keep at least 1 image");
    }

    #[test]
    fn zoom_reports_new_scale() {
        let mut app = app();
        app.handle_command(LightboxAction::ToggleEdit);
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.status.message(), "Zoom 125%");
        let scale = app
            .edit
            .get(&series().child(0usize).child("scale"))
            .and_then(Value::as_f64);
        assert_eq!(scale, Some(1.25));
    }

    #[test]
    fn wheel_steps_once_per_cooldown() {
        let mut app = app();
        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        let start = Instant::now();
        app.handle_mouse(scroll, start);
        app.handle_mouse(scroll, start + Duration::from_millis(40));
        assert_eq!(app.lightbox.current_index(), Some(1));
        app.handle_mouse(scroll, start + Duration::from_millis(400));
        assert_eq!(app.lightbox.current_index(), Some(0));
    }

    #[test]
    fn close_returns_session_with_edits() {
        let mut app = app();
        app.handle_command(LightboxAction::ToggleEdit);
        app.handle_command(LightboxAction::AddImage);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
        let edit = app.into_session();
        assert_eq!(edit.get(&series()).and_then(Value::as_array).map(Vec::len), Some(3));
    }

    #[test]
    fn draws_series_title_and_counter() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("test terminal");
        terminal.draw(|frame| app.draw(frame)).expect("draw");
        let buffer = terminal.backend().buffer();
        let header: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 1)].symbol())
            .collect();
        assert!(header.contains("Born in Thorns"), "header was {header:?}");
        assert!(header.contains("1 / 2"), "header was {header:?}");
    }
}
