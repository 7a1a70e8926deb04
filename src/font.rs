//! Bitmap font loaded from a plain-text glyph sheet.
//!
//! ```text
//! ; comment
//! size 3 5
//! [A]
//! .#.
//! #.#
//! ###
//! #.#
//! #.#
//! ```

use log::{error, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("cannot read font {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font has no `size W H` header")]
    MissingHeader,
    #[error("line {line}: malformed size header")]
    BadHeader { line: usize },
    #[error("line {line}: glyph name must be a single character in brackets")]
    BadGlyphName { line: usize },
    #[error("line {line}: pixel row outside of a glyph")]
    UnexpectedRow { line: usize },
    #[error("line {line}: glyph {glyph:?} row is {found} wide, expected {expected}")]
    RowWidth {
        glyph: char,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("glyph {glyph:?} has {found} rows, expected {expected}")]
    RowCount {
        glyph: char,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid pixel {ch:?}, use '#' or '.'")]
    BadPixel { line: usize, ch: char },
}

#[derive(Debug, Clone, Default)]
pub struct Font {
    width: usize,
    height: usize,
    glyphs: HashMap<char, Vec<bool>>,
}

impl Font {
    /// A font with no glyphs; every string draws as nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Row-major pixels of `ch`, letters matched case-insensitively.
    pub fn glyph(&self, ch: char) -> Option<&[bool]> {
        self.glyphs
            .get(&ch.to_ascii_uppercase())
            .map(|g| g.as_slice())
    }

    /// Horizontal advance per character, including the 1px spacing.
    pub fn advance(&self) -> usize {
        if self.is_empty() { 0 } else { self.width + 1 }
    }

    pub fn text_width(&self, text: &str) -> usize {
        let n = text.chars().count();
        if n == 0 || self.is_empty() {
            0
        } else {
            n * self.advance() - 1
        }
    }

    pub fn parse(text: &str) -> Result<Self, FontError> {
        let mut size: Option<(usize, usize)> = None;
        let mut glyphs = HashMap::new();
        let mut current: Option<(char, Vec<bool>, usize)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end();
            if line.trim().is_empty() || line.starts_with(';') {
                continue;
            }

            let Some((w, h)) = size else {
                size = Some(parse_header(line, line_no)?);
                continue;
            };

            if line.starts_with('[') {
                if let Some((glyph, px, rows)) = current.take() {
                    finish_glyph(&mut glyphs, glyph, px, rows, h)?;
                }
                let name = line
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .ok_or(FontError::BadGlyphName { line: line_no })?;
                let mut chars = name.chars();
                let glyph = match (chars.next(), chars.next()) {
                    (Some(c), None) => c.to_ascii_uppercase(),
                    _ => return Err(FontError::BadGlyphName { line: line_no }),
                };
                current = Some((glyph, Vec::with_capacity(w * h), 0));
                continue;
            }

            let Some((glyph, px, rows)) = current.as_mut() else {
                return Err(FontError::UnexpectedRow { line: line_no });
            };
            if *rows == h {
                return Err(FontError::RowCount {
                    glyph: *glyph,
                    expected: h,
                    found: h + 1,
                });
            }
            let found = line.chars().count();
            if found != w {
                return Err(FontError::RowWidth {
                    glyph: *glyph,
                    line: line_no,
                    expected: w,
                    found,
                });
            }
            for ch in line.chars() {
                match ch {
                    '#' => px.push(true),
                    '.' => px.push(false),
                    _ => return Err(FontError::BadPixel { line: line_no, ch }),
                }
            }
            *rows += 1;
        }

        let (width, height) = size.ok_or(FontError::MissingHeader)?;
        if let Some((glyph, px, rows)) = current {
            finish_glyph(&mut glyphs, glyph, px, rows, height)?;
        }
        Ok(Self {
            width,
            height,
            glyphs,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Loads the font, or logs why it could not and returns [`Font::empty`].
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(font) => {
                info!("loaded {} glyphs from {}", font.len(), path.display());
                font
            }
            Err(e) => {
                error!("error loading font: {e}");
                match std::env::current_dir() {
                    Ok(cwd) => error!("current working directory: {}", cwd.display()),
                    Err(e) => error!("current working directory unavailable: {e}"),
                }
                Self::empty()
            }
        }
    }
}

fn parse_header(line: &str, line_no: usize) -> Result<(usize, usize), FontError> {
    let bad = || FontError::BadHeader { line: line_no };
    let mut parts = line.split_whitespace();
    if parts.next() != Some("size") {
        return Err(FontError::MissingHeader);
    }
    let w: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let h: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    if w == 0 || h == 0 || parts.next().is_some() {
        return Err(bad());
    }
    Ok((w, h))
}

fn finish_glyph(
    glyphs: &mut HashMap<char, Vec<bool>>,
    glyph: char,
    px: Vec<bool>,
    rows: usize,
    height: usize,
) -> Result<(), FontError> {
    if rows != height {
        return Err(FontError::RowCount {
            glyph,
            expected: height,
            found: rows,
        });
    }
    glyphs.insert(glyph, px);
    Ok(())
}
