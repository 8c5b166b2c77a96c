use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use super::DocumentFormat;

/// Where an exported document is written.
#[derive(Debug, Clone)]
pub enum ExportTarget {
    Stdout,
    File(PathBuf),
}

impl ExportTarget {
    pub fn file(path: impl AsRef<Path>) -> Self {
        ExportTarget::File(path.as_ref().to_path_buf())
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub target: ExportTarget,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Json,
            pretty: true,
            target: ExportTarget::Stdout,
        }
    }
}

impl ExportOptions {
    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_target(mut self, target: ExportTarget) -> Self {
        self.target = target;
        self
    }
}

/// Serializes the content document and writes it to the configured target.
pub fn export_document(document: &Value, options: &ExportOptions) -> Result<()> {
    let payload = render_document(document, options.format, options.pretty)?;
    match &options.target {
        ExportTarget::Stdout => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{payload}").context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
        ExportTarget::File(path) => write_file(path, &payload)
            .with_context(|| format!("failed to write to file {}", path.display())),
    }
}

pub fn render_document(document: &Value, format: DocumentFormat, pretty: bool) -> Result<String> {
    match format {
        DocumentFormat::Json if pretty => {
            serde_json::to_string_pretty(document).context("failed to serialize JSON")
        }
        DocumentFormat::Json => serde_json::to_string(document).context("failed to serialize JSON"),
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(document).context("failed to serialize YAML"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml if pretty => {
            toml::to_string_pretty(document).context("failed to serialize TOML")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::to_string(document).context("failed to serialize TOML"),
    }
}

fn write_file(path: &Path, payload: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(payload.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    Ok(())
}
