// src/material.rs - Wall materials and their per-wall radio attenuation

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    General,
    Drywall,
    Glass,
    Wood,
    Brick,
    Concrete,
    Marble,
    Metal,
}

impl MaterialType {
    pub const ALL: [MaterialType; 8] = [
        MaterialType::General,
        MaterialType::Drywall,
        MaterialType::Glass,
        MaterialType::Wood,
        MaterialType::Brick,
        MaterialType::Concrete,
        MaterialType::Marble,
        MaterialType::Metal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::General => "general",
            MaterialType::Drywall => "drywall",
            MaterialType::Glass => "glass",
            MaterialType::Wood => "wood",
            MaterialType::Brick => "brick",
            MaterialType::Concrete => "concrete",
            MaterialType::Marble => "marble",
            MaterialType::Metal => "metal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "general" => Some(MaterialType::General),
            "drywall" => Some(MaterialType::Drywall),
            "glass" => Some(MaterialType::Glass),
            "wood" => Some(MaterialType::Wood),
            "brick" => Some(MaterialType::Brick),
            "concrete" => Some(MaterialType::Concrete),
            "marble" => Some(MaterialType::Marble),
            "metal" => Some(MaterialType::Metal),
            _ => None,
        }
    }

    /// Finds the first material keyword inside an arbitrary scene identifier
    /// such as `mat-itu_concrete` or `Wall_North`.
    ///
    /// `wall` alone maps to concrete, and `diffuse` (a plain BSDF) to general.
    pub fn classify(identifier: &str) -> Option<Self> {
        let lower = identifier.to_ascii_lowercase();
        // strongest attenuators first so "metal_glass_door" reads as metal
        for kind in [
            MaterialType::Metal,
            MaterialType::Marble,
            MaterialType::Concrete,
            MaterialType::Brick,
            MaterialType::Wood,
            MaterialType::Glass,
            MaterialType::Drywall,
        ] {
            if lower.contains(kind.as_str()) {
                return Some(kind);
            }
        }
        if lower.contains("wall") {
            Some(MaterialType::Concrete)
        } else if lower.contains("diffuse") || lower.contains("general") {
            Some(MaterialType::General)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaterialProfile {
    pub kind: MaterialType,
    /// Loss added for each wall of this material between AP and client
    pub wall_attenuation_db: f64,
}

pub static MATERIAL_PROFILES: Lazy<HashMap<MaterialType, MaterialProfile>> = Lazy::new(|| {
    use MaterialType::*;
    let mut m = HashMap::new();

    for (kind, wall_attenuation_db) in [
        (General, 5.0),
        (Drywall, 10.0),
        (Glass, 6.0),
        (Wood, 8.0),
        (Brick, 12.0),
        (Concrete, 15.0),
        (Marble, 18.0),
        (Metal, 25.0),
    ] {
        m.insert(kind, MaterialProfile { kind, wall_attenuation_db });
    }

    m
});

pub fn get_profile(kind: MaterialType) -> Option<&'static MaterialProfile> {
    MATERIAL_PROFILES.get(&kind)
}

pub fn wall_attenuation_db(kind: MaterialType) -> f64 {
    get_profile(kind).map_or(0.0, |p| p.wall_attenuation_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_material_has_a_profile() {
        for kind in MaterialType::ALL {
            let profile = get_profile(kind).expect("profile");
            assert_eq!(profile.kind, kind);
            assert!(profile.wall_attenuation_db > 0.0);
            assert_eq!(MaterialType::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn classify_scene_identifiers() {
        assert_eq!(MaterialType::classify("mat-itu_concrete"), Some(MaterialType::Concrete));
        assert_eq!(MaterialType::classify("Wall_North"), Some(MaterialType::Concrete));
        assert_eq!(MaterialType::classify("metal_glass_door"), Some(MaterialType::Metal));
        assert_eq!(MaterialType::classify("diffuse"), Some(MaterialType::General));
        assert_eq!(MaterialType::classify("floor_plate"), None);
    }

    #[test]
    fn attenuation_spans_wall_range() {
        assert_eq!(wall_attenuation_db(MaterialType::Drywall), 10.0);
        assert_eq!(wall_attenuation_db(MaterialType::Concrete), 15.0);
        assert_eq!(wall_attenuation_db(MaterialType::Metal), 25.0);
    }
}
