//! Layout file discovery, format detection and deserialization.

use std::path::{Path, PathBuf};

use stagecraft_core::StageError;

use crate::layout::StageLayout;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a layout or building a Stage from it.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// No layout file with the requested base name exists in the directory.
    #[error("layout '{base_name}' not found in {dir}")]
    MissingLayout { base_name: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {origin}: {detail}")]
    Parse { origin: String, detail: String },

    /// Two scenes in one layout share a name.
    #[error("duplicate scene '{name}' in layout")]
    DuplicateScene { name: String },

    /// The layout's default names a scene it does not declare.
    #[error("default scene '{name}' is not declared in the layout")]
    UnknownDefault { name: String },

    /// The surface could not resolve a panel or trigger selector.
    #[error("{kind} selector '{selector}' for scene '{scene}' did not resolve")]
    UnresolvedSelector {
        scene: String,
        selector: String,
        kind: &'static str,
    },

    /// Driving the assembled Stage failed.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported layout file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, LayoutError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(LayoutError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find the layout file `{base_name}.{ron,toml,json}` in `dir`.
///
/// Fails with `MissingLayout` when none exists and `ConflictingFormats` when
/// more than one does.
pub fn find_layout(dir: &Path, base_name: &str) -> Result<PathBuf, LayoutError> {
    let mut found: Option<PathBuf> = None;

    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(LayoutError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    found.ok_or_else(|| LayoutError::MissingLayout {
        base_name: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Parse and validate a layout held in memory. `origin` labels parse errors.
pub fn parse_layout(
    content: &str,
    format: Format,
    origin: &str,
) -> Result<StageLayout, LayoutError> {
    let parse_err = |detail: String| LayoutError::Parse {
        origin: origin.to_string(),
        detail,
    };

    let layout: StageLayout = match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
    };

    layout.validate()?;
    tracing::debug!(
        origin,
        scenes = layout.scenes.len(),
        default = ?layout.default,
        "layout parsed"
    );
    Ok(layout)
}

/// Read, parse and validate a layout file (format detected from extension).
pub fn load_layout(path: &Path) -> Result<StageLayout, LayoutError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_layout(&content, format, &path.display().to_string())
}
