use anyhow::{Context, Result};

use super::{options::BrowserOptions, runtime::App};
use crate::{domain::FieldPath, io::Storage, session::EditSession};

/// Full-screen lightbox over one image sequence.
///
/// ```no_run
/// use folio::{BrowserOptions, EditSession, FileStorage, GalleryBrowser, field_path};
///
/// let session = EditSession::open(FileStorage::new(".folio"));
/// let session = GalleryBrowser::new(session, field_path!["artSeries", 0usize, "images"])
///     .with_start(1)
///     .with_options(BrowserOptions::default().with_help(false))
///     .run()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct GalleryBrowser<S> {
    session: EditSession<S>,
    array_path: FieldPath,
    start: usize,
    options: BrowserOptions,
}

impl<S: Storage> GalleryBrowser<S> {
    pub fn new(session: EditSession<S>, array_path: FieldPath) -> Self {
        Self {
            session,
            array_path,
            start: 0,
            options: BrowserOptions::default(),
        }
    }

    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn with_options(mut self, options: BrowserOptions) -> Self {
        self.options = options;
        self
    }

    /// Blocks until the lightbox is closed and hands the session back.
    pub fn run(self) -> Result<EditSession<S>> {
        let GalleryBrowser {
            session,
            array_path,
            start,
            options,
        } = self;
        let label = array_path.to_string();
        let app = App::new(session, array_path, start, options)
            .with_context(|| format!("cannot browse {label}"))?;
        app.run()
    }
}
