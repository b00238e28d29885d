//! Page layout files for the simulator.
//!
//! A layout describes one scrollable container and the lazy images inside
//! it, in viewport pixels:
//!
//! ```json
//! {
//!   "container": { "left": 0, "top": 0, "width": 800, "height": 600 },
//!   "images": [
//!     { "id": "hero", "rect": { "left": 0, "top": 0, "width": 800, "height": 300 },
//!       "src": "https://example.com/hero.jpg" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use lazyload::ElementRect;
use serde::Deserialize;

use crate::error::CliError;

/// A rectangle in layout files.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectSpec {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl From<RectSpec> for ElementRect {
    fn from(rect: RectSpec) -> Self {
        ElementRect::new(rect.left, rect.top, rect.width, rect.height)
    }
}

/// One lazy image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    pub id: String,
    pub rect: RectSpec,
    pub src: String,
}

/// A parsed and validated layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    pub container: RectSpec,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
}

impl Layout {
    /// Reads and validates a layout file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = std::fs::read_to_string(path).map_err(|source| CliError::LayoutRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    /// Parses and validates layout JSON.
    pub fn parse(json: &str) -> Result<Self, CliError> {
        let layout: Layout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<(), CliError> {
        check_rect("container", &self.container)?;

        let mut seen = HashSet::new();
        for image in &self.images {
            if image.id.is_empty() {
                return Err(CliError::Layout("image id must not be empty".to_string()));
            }
            if !seen.insert(image.id.as_str()) {
                return Err(CliError::Layout(format!("duplicate image id '{}'", image.id)));
            }
            if image.src.is_empty() {
                return Err(CliError::Layout(format!("image '{}' has an empty src", image.id)));
            }
            check_rect(&image.id, &image.rect)?;
        }
        Ok(())
    }
}

fn check_rect(name: &str, rect: &RectSpec) -> Result<(), CliError> {
    let values = [rect.left, rect.top, rect.width, rect.height];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CliError::Layout(format!("'{}' has a non-finite coordinate", name)));
    }
    if rect.width < 0.0 || rect.height < 0.0 {
        return Err(CliError::Layout(format!("'{}' has a negative size", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "container": { "left": 0, "top": 0, "width": 800, "height": 600 },
        "images": [
            { "id": "a", "rect": { "left": 0, "top": 0, "width": 200, "height": 150 }, "src": "a.png" },
            { "id": "b", "rect": { "left": 0, "top": 900, "width": 200, "height": 150 }, "src": "b.png" }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let layout = Layout::parse(SAMPLE).unwrap();
        assert_eq!(layout.images.len(), 2);
        assert_eq!(layout.images[1].rect.top, 900.0);

        let rect: ElementRect = layout.container.into();
        assert_eq!(rect, ElementRect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let layout = Layout::load(file.path()).unwrap();
        assert_eq!(layout.images[0].id, "a");
    }

    #[test]
    fn test_missing_file() {
        let result = Layout::load(Path::new("/nonexistent/layout.json"));
        assert!(matches!(result, Err(CliError::LayoutRead { .. })));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"{
            "container": { "left": 0, "top": 0, "width": 800, "height": 600 },
            "images": [
                { "id": "a", "rect": { "left": 0, "top": 0, "width": 1, "height": 1 }, "src": "1.png" },
                { "id": "a", "rect": { "left": 0, "top": 0, "width": 1, "height": 1 }, "src": "2.png" }
            ]
        }"#;
        let err = Layout::parse(json).unwrap_err();
        assert_eq!(err.to_string(), "Invalid layout: duplicate image id 'a'");
    }

    #[test]
    fn test_rejects_negative_size() {
        let json = r#"{ "container": { "left": 0, "top": 0, "width": -1, "height": 600 } }"#;
        assert!(matches!(Layout::parse(json), Err(CliError::Layout(_))));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let json = r#"{ "container": { "left": 0, "top": 0, "width": 1, "height": 1 }, "extra": 1 }"#;
        assert!(matches!(Layout::parse(json), Err(CliError::LayoutParse(_))));
    }
}
