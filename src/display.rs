//! Mount points the tutor draws into: a text label and a notation surface.
//!
//! The tutor owns what is shown in both but not where they live; the
//! surrounding shell decides that by choosing a [`Display`] implementation.

use std::path::{Path, PathBuf};

use crate::renderer::{empty_svg, NotationSurface};

pub trait Display {
    fn set_label(&mut self, text: &str);
    fn clear_label(&mut self);
    /// Replace whatever notation is currently shown.
    fn set_notation(&mut self, surface: NotationSurface);
    fn clear_notation(&mut self);
}

/// Keeps the displayed state in memory and counts every change made to it.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    pub label: String,
    pub notation: Option<NotationSurface>,
    /// Number of calls to any of the [`Display`] methods.
    pub updates: usize,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self) -> bool {
        self.label.is_empty() && self.notation.is_none()
    }
}

impl Display for MemoryDisplay {
    fn set_label(&mut self, text: &str) {
        self.label = text.to_string();
        self.updates += 1;
    }

    fn clear_label(&mut self) {
        self.label.clear();
        self.updates += 1;
    }

    fn set_notation(&mut self, surface: NotationSurface) {
        self.notation = Some(surface);
        self.updates += 1;
    }

    fn clear_notation(&mut self) {
        self.notation = None;
        self.updates += 1;
    }
}

/// Prints the label to stdout and keeps the notation in an SVG file.
#[derive(Debug)]
pub struct FileDisplay {
    svg_path: PathBuf,
}

impl FileDisplay {
    pub fn new(svg_path: impl Into<PathBuf>) -> Self {
        Self {
            svg_path: svg_path.into(),
        }
    }

    pub fn svg_path(&self) -> &Path {
        &self.svg_path
    }

    fn write_svg(&self, svg: &str) {
        if let Err(e) = std::fs::write(&self.svg_path, svg) {
            log::error!("failed to write notation to {}: {e}", self.svg_path.display());
        }
    }
}

impl Display for FileDisplay {
    fn set_label(&mut self, text: &str) {
        println!("Play: {text}");
    }

    fn clear_label(&mut self) {
        println!("Done!");
    }

    fn set_notation(&mut self, surface: NotationSurface) {
        self.write_svg(&surface.to_svg());
    }

    /// Leaves an empty document in place so the path stays viewable.
    fn clear_notation(&mut self) {
        self.write_svg(&empty_svg());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_display_tracks_state_and_updates() {
        let mut display = MemoryDisplay::new();
        assert!(display.is_cleared());

        display.set_label("G");
        assert_eq!(display.label, "G");
        assert!(!display.is_cleared());

        display.clear_label();
        display.clear_notation();
        assert!(display.is_cleared());
        assert_eq!(display.updates, 3);
    }

    #[test]
    fn file_display_writes_an_empty_document_on_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = FileDisplay::new(dir.path().join("notation.svg"));
        std::fs::write(display.svg_path(), r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#).unwrap();

        display.clear_notation();

        let svg = std::fs::read_to_string(display.svg_path()).unwrap();
        let doc = roxmltree::Document::parse(&svg).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "svg");
        assert_eq!(doc.root_element().children().filter(|n| n.is_element()).count(), 0);
    }
}
