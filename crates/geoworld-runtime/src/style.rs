//! Building style table: ordered rules, first match wins.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geoworld_geom::Vec3;
use geoworld_world::ChunkKey;
use geoworld_world::config::BuildingRuleDef;

/// Uniform prefab scale per metre of footprint.
pub const PREFAB_SCALE_PER_METER: f32 = 0.08;

#[derive(Clone, Debug, PartialEq)]
pub struct StyleRule {
    pub style: String,
    /// Matches only when the height is strictly greater.
    pub min_height: Option<f32>,
    /// Matches only when the footprint is strictly greater.
    pub min_footprint: Option<f32>,
    pub prefabs: Vec<String>,
}

impl StyleRule {
    pub fn new(style: &str) -> Self {
        Self {
            style: style.to_string(),
            min_height: None,
            min_footprint: None,
            prefabs: Vec::new(),
        }
    }

    pub fn matches(&self, height: f32, footprint: f32) -> bool {
        self.min_height.is_none_or(|h| height > h) && self.min_footprint.is_none_or(|f| footprint > f)
    }
}

impl From<&BuildingRuleDef> for StyleRule {
    fn from(d: &BuildingRuleDef) -> Self {
        Self {
            style: d.style.clone(),
            min_height: d.min_height,
            min_footprint: d.min_footprint,
            prefabs: d.prefabs.clone(),
        }
    }
}

/// What a building turns into.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildingVisual {
    Prefab(String),
    /// Box of `footprint x height x footprint`.
    Placeholder,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleChoice {
    pub style: String,
    pub visual: BuildingVisual,
    pub scale: Vec3,
}

#[derive(Clone, Debug)]
pub struct StyleTable {
    rules: Vec<StyleRule>,
}

impl Default for StyleTable {
    /// Tall towers, mid-rise modern, wide old blocks, everything else.
    fn default() -> Self {
        let rule = |style: &str, h: Option<f32>, f: Option<f32>| StyleRule {
            min_height: h,
            min_footprint: f,
            ..StyleRule::new(style)
        };
        Self {
            rules: vec![
                rule("glass_tower", Some(40.0), None),
                rule("modern", Some(25.0), None),
                rule("stalinka", None, Some(12.0)),
                rule("khrushchyovka", None, None),
            ],
        }
    }
}

impl StyleTable {
    pub fn new(rules: Vec<StyleRule>) -> Self {
        Self { rules }
    }

    /// Configured rules, or the built-in table when none are given.
    pub fn from_config(defs: &[BuildingRuleDef]) -> Self {
        if defs.is_empty() {
            Self::default()
        } else {
            Self::new(defs.iter().map(StyleRule::from).collect())
        }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn rule_for(&self, height: f32, footprint: f32) -> Option<&StyleRule> {
        self.rules.iter().find(|r| r.matches(height, footprint))
    }

    /// Style and visual for building `index` of `chunk`. The prefab pick is seeded
    /// from the chunk and index so a reloaded chunk shows the same buildings.
    pub fn choose(&self, seed: u64, chunk: ChunkKey, index: usize, height: f32, footprint: f32) -> StyleChoice {
        let placeholder_scale = Vec3::new(footprint, height, footprint);
        let Some(rule) = self.rule_for(height, footprint) else {
            return StyleChoice {
                style: "unstyled".to_string(),
                visual: BuildingVisual::Placeholder,
                scale: placeholder_scale,
            };
        };
        if rule.prefabs.is_empty() {
            log::debug!(target: "stream", "style '{}' has no prefabs; using placeholder box", rule.style);
            return StyleChoice {
                style: rule.style.clone(),
                visual: BuildingVisual::Placeholder,
                scale: placeholder_scale,
            };
        }
        let mut rng = building_rng(seed, chunk, index);
        let pick = rng.gen_range(0..rule.prefabs.len());
        let s = footprint * PREFAB_SCALE_PER_METER;
        StyleChoice {
            style: rule.style.clone(),
            visual: BuildingVisual::Prefab(rule.prefabs[pick].clone()),
            scale: Vec3::new(s, s, s),
        }
    }
}

fn building_rng(seed: u64, chunk: ChunkKey, index: usize) -> StdRng {
    let s = seed
        .wrapping_add(chunk.cx as u64)
        .wrapping_mul(73856093)
        .wrapping_add(chunk.cz as u64)
        .wrapping_mul(19349663)
        .wrapping_add(index as u64)
        .wrapping_mul(83492791);
    StdRng::seed_from_u64(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let t = StyleTable::default();
        let style = |h, f| t.rule_for(h, f).unwrap().style.as_str();
        assert_eq!(style(41.0, 5.0), "glass_tower");
        assert_eq!(style(40.0, 5.0), "modern");
        assert_eq!(style(26.0, 13.0), "modern");
        assert_eq!(style(25.0, 13.0), "stalinka");
        assert_eq!(style(20.0, 12.0), "khrushchyovka");
    }

    #[test]
    fn empty_pool_gives_placeholder_box() {
        let c = StyleTable::default().choose(1, ChunkKey::new(0, 0), 0, 30.0, 8.0);
        assert_eq!(c.style, "modern");
        assert_eq!(c.visual, BuildingVisual::Placeholder);
        assert_eq!(c.scale, Vec3::new(8.0, 30.0, 8.0));
    }

    #[test]
    fn prefab_pick_is_stable_per_chunk_and_index() {
        let mut rule = StyleRule::new("any");
        rule.prefabs = (0..16).map(|i| format!("p{i}")).collect();
        let t = StyleTable::new(vec![rule]);
        let k = ChunkKey::new(3, -2);
        for i in 0..10 {
            assert_eq!(t.choose(9, k, i, 20.0, 10.0), t.choose(9, k, i, 20.0, 10.0));
        }
        let c = t.choose(9, k, 0, 20.0, 10.0);
        assert!((c.scale.x - 0.8).abs() < 1e-6);
        assert!(matches!(c.visual, BuildingVisual::Prefab(_)));
    }

    #[test]
    fn unmatched_rules_fall_back() {
        let mut tall = StyleRule::new("tall");
        tall.min_height = Some(50.0);
        let t = StyleTable::from_config(&[]);
        assert_eq!(t.rules().len(), 4);
        let t = StyleTable::new(vec![tall]);
        let c = t.choose(0, ChunkKey::default(), 0, 20.0, 6.0);
        assert_eq!(c.visual, BuildingVisual::Placeholder);
    }
}
