//! Building scene inspection.
//!
//! Scenes are Mitsuba-style XML documents: a `<scene version="...">` root
//! holding `<shape>` elements that reference materials through nested `<ref>`
//! or `<bsdf>` elements. Only a rough summary is extracted (shape count,
//! material tags, approximate x/y bounds). Geometry itself is never loaded.

use crate::constants::{DEFAULT_BUILDING_MAX_XY, DEFAULT_BUILDING_MIN_XY};
use crate::error::SceneError;
use crate::material::{self, MaterialType};
use crate::transmitter::Bounds;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneShape {
    pub id: String,
    pub kind: String,
    /// Material reference (`<ref id>`, `<bsdf id>` or `<bsdf type>`)
    pub material_ref: Option<String>,
    pub material: Option<MaterialType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneDescriptor {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Root element is `<scene>` carrying a `version` attribute
    pub valid_format: bool,
    pub version: Option<String>,
    pub shape_count: usize,
    pub shapes: Vec<SceneShape>,
    /// Material keywords seen anywhere in shape ids or material references
    pub material_tags: Vec<MaterialType>,
    pub bounds: Bounds,
    pub used_default_bounds: bool,
}

impl SceneDescriptor {
    /// Descriptor used when a scene cannot be read
    pub fn fallback(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size_bytes: 0,
            valid_format: false,
            version: None,
            shape_count: 0,
            shapes: Vec::new(),
            material_tags: Vec::new(),
            bounds: default_bounds(),
            used_default_bounds: true,
        }
    }

    /// Most common classified shape material; ties go to the stronger attenuator.
    pub fn dominant_material(&self) -> Option<MaterialType> {
        let mut counts: HashMap<MaterialType, usize> = HashMap::new();
        for kind in self.shapes.iter().filter_map(|s| s.material) {
            *counts.entry(kind).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by(|(ka, ca), (kb, cb)| {
                ca.cmp(cb).then(
                    material::wall_attenuation_db(*ka).total_cmp(&material::wall_attenuation_db(*kb)),
                )
            })
            .map(|(kind, _)| kind)
    }
}

pub fn default_bounds() -> Bounds {
    Bounds::new(
        DEFAULT_BUILDING_MIN_XY.0,
        DEFAULT_BUILDING_MIN_XY.1,
        DEFAULT_BUILDING_MAX_XY.0,
        DEFAULT_BUILDING_MAX_XY.1,
    )
}

/// Reads and parses a scene file.
pub fn parse_scene_file<P: AsRef<Path>>(path: P) -> Result<SceneDescriptor, SceneError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut scene = parse_scene_str(&content)?;
    scene.path = path.to_path_buf();
    scene.size_bytes = content.len() as u64;
    Ok(scene)
}

/// Like [`parse_scene_file`] but never fails: problems are logged and the
/// default building bounds are used instead.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> SceneDescriptor {
    let path = path.as_ref();
    match parse_scene_file(path) {
        Ok(scene) => {
            info!(
                "Scene {}: {} shapes, materials [{}]",
                path.display(),
                scene.shape_count,
                scene
                    .material_tags
                    .iter()
                    .map(MaterialType::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            scene
        }
        Err(e) => {
            warn!("Could not parse scene details: {}; using default building bounds", e);
            SceneDescriptor::fallback(path)
        }
    }
}

#[derive(Default)]
struct ShapeBuilder {
    id: String,
    kind: String,
    material_ref: Option<String>,
}

impl ShapeBuilder {
    fn finish(self) -> SceneShape {
        let material = self
            .material_ref
            .as_deref()
            .and_then(MaterialType::classify)
            .or_else(|| MaterialType::classify(&self.id));
        SceneShape {
            id: self.id,
            kind: self.kind,
            material_ref: self.material_ref,
            material,
        }
    }
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Parses scene XML already held in memory. `path` and `size_bytes` are left empty.
pub fn parse_scene_str(content: &str) -> Result<SceneDescriptor, SceneError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut scene = SceneDescriptor::fallback(PathBuf::new());
    scene.size_bytes = content.len() as u64;

    let mut depth = 0usize;
    let mut root_seen = false;
    let mut open_shape: Option<(usize, ShapeBuilder)> = None;
    let mut tags: Vec<MaterialType> = Vec::new();
    let mut point_bounds: Option<Bounds> = None;

    loop {
        let event = reader.read_event().map_err(|e| SceneError::Xml {
            position: reader.error_position(),
            message: e.to_string(),
        })?;

        let (start, is_empty) = match &event {
            Event::Start(e) => (Some(e.clone()), false),
            Event::Empty(e) => (Some(e.clone()), true),
            Event::End(_) => {
                if let Some((shape_depth, _)) = &open_shape {
                    if *shape_depth == depth {
                        if let Some((_, builder)) = open_shape.take() {
                            scene.shapes.push(builder.finish());
                        }
                    }
                }
                depth = depth.saturating_sub(1);
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let Some(e) = start else { continue };
        if !is_empty {
            depth += 1;
        }

        let name = e.name();
        let name = name.as_ref();

        if !root_seen {
            root_seen = true;
            if name == b"scene" {
                scene.version = attr(&e, b"version");
                scene.valid_format = scene.version.is_some();
            }
        }

        match name {
            b"shape" => {
                scene.shape_count += 1;
                let builder = ShapeBuilder {
                    id: attr(&e, b"id").unwrap_or_else(|| "unknown".to_string()),
                    kind: attr(&e, b"type").unwrap_or_else(|| "unknown".to_string()),
                    material_ref: None,
                };
                if is_empty {
                    scene.shapes.push(builder.finish());
                } else {
                    open_shape = Some((depth, builder));
                }
            }
            b"ref" | b"bsdf" => {
                let reference = attr(&e, b"id").or_else(|| attr(&e, b"type"));
                if let Some(reference) = reference {
                    if let Some(kind) = MaterialType::classify(&reference) {
                        if !tags.contains(&kind) {
                            tags.push(kind);
                        }
                    }
                    if let Some((_, builder)) = open_shape.as_mut() {
                        if builder.material_ref.is_none() {
                            builder.material_ref = Some(reference);
                        }
                    }
                }
            }
            b"translate" | b"point" => {
                let x = attr(&e, b"x").and_then(|v| v.trim().parse::<f64>().ok());
                let y = attr(&e, b"y").and_then(|v| v.trim().parse::<f64>().ok());
                if let (Some(x), Some(y)) = (x, y) {
                    match point_bounds.as_mut() {
                        Some(b) => b.include(x, y),
                        None => point_bounds = Some(Bounds::new(x, y, x, y)),
                    }
                }
            }
            _ => {}
        }
    }

    for shape in &scene.shapes {
        if let Some(kind) = MaterialType::classify(&shape.id) {
            if !tags.contains(&kind) {
                tags.push(kind);
            }
        }
    }
    scene.material_tags = tags;

    if let Some(bounds) = point_bounds.filter(|b| b.width() > 0.0 && b.height() > 0.0) {
        scene.bounds = bounds;
        scene.used_default_bounds = false;
    }

    debug!(
        shapes = scene.shape_count,
        valid = scene.valid_format,
        "parsed scene"
    );
    Ok(scene)
}
