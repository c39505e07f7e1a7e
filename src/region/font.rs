use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{GlyphreelError, GlyphreelResult};

/// Where the region's font comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    /// A font file on disk (`.ttf`, `.otf`, `.ttc`).
    File(PathBuf),
    /// Font bytes already in memory (face index 0).
    #[serde(skip)]
    Bytes(Arc<[u8]>),
    /// An installed font looked up by family name.
    ///
    /// `sans-serif`, `serif` and `monospace` map to the generic families.
    System {
        /// Family name, e.g. `"DejaVu Sans"`.
        family: String,
    },
}

impl Default for FontSource {
    fn default() -> Self {
        Self::System {
            family: "sans-serif".to_owned(),
        }
    }
}

/// Font bytes plus the face index inside them.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// Raw font file bytes.
    pub bytes: Arc<[u8]>,
    /// Face index for collections; `0` for single-face files.
    pub index: u32,
}

impl FontSource {
    /// Load the backing font asset.
    ///
    /// Fails when the file is missing or no installed family matches.
    pub fn resolve(&self) -> GlyphreelResult<ResolvedFont> {
        match self {
            Self::File(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read font '{}'", path.display()))?;
                if bytes.is_empty() {
                    return Err(GlyphreelError::validation(format!(
                        "font file '{}' is empty",
                        path.display()
                    )));
                }
                Ok(ResolvedFont {
                    bytes: Arc::from(bytes),
                    index: 0,
                })
            }
            Self::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(GlyphreelError::validation("in-memory font bytes are empty"));
                }
                Ok(ResolvedFont {
                    bytes: bytes.clone(),
                    index: 0,
                })
            }
            Self::System { family } => resolve_system_family(family),
        }
    }
}

fn system_fonts() -> &'static usvg::fontdb::Database {
    static DB: OnceLock<usvg::fontdb::Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system font database");
        db
    })
}

fn resolve_system_family(family: &str) -> GlyphreelResult<ResolvedFont> {
    use usvg::fontdb::{Family, Query};

    let family = family.trim();
    if family.is_empty() {
        return Err(GlyphreelError::validation("font family name is empty"));
    }
    let fam = match family.to_ascii_lowercase().as_str() {
        "sans-serif" | "sans" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" | "mono" => Family::Monospace,
        "cursive" => Family::Cursive,
        _ => Family::Name(family),
    };

    let db = system_fonts();
    let id = db
        .query(&Query {
            families: &[fam],
            ..Query::default()
        })
        .ok_or_else(|| {
            GlyphreelError::validation(format!("no installed font matches family '{family}'"))
        })?;

    db.with_face_data(id, |data, index| ResolvedFont {
        bytes: Arc::from(data),
        index,
    })
    .ok_or_else(|| {
        GlyphreelError::validation(format!("font data for family '{family}' is unavailable"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/region/font.rs"]
mod tests;
