//! Naming-policy resolver.
//!
//! Group names carry all processing policy as embedded tokens. Matching is a
//! case-sensitive substring search, and any number of tokens may co-occur:
//!
//! | Token | Effect |
//! |-------|--------|
//! | `JOIN` | merge direct members into the first one |
//! | `UNWRAP` | compute a UV atlas for direct members |
//! | `VERT` | bake lighting into a vertex color channel |
//! | `TEX` | bake lighting into an image texture |
//! | `256` / `512` / `1024` / `2048` | texture resolution tier (first match wins) |
//!
//! Unrecognized tokens are ignored; resolution never fails.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const JOIN_TOKEN: &str = "JOIN";
pub const UNWRAP_TOKEN: &str = "UNWRAP";
pub const VERT_TOKEN: &str = "VERT";
pub const TEX_TOKEN: &str = "TEX";

/// Root groups processed in the first sweep.
pub const PROPS_TOKEN: &str = "PROPS";
/// Root groups processed in the second sweep.
pub const ARCH_TOKEN: &str = "ARCH";

/// Tier used when no resolution token is present.
pub const DEFAULT_RESOLUTION_TIER: u32 = 1024;

/// Resolution tokens and the tier each selects, in match priority order.
///
/// Each token maps one step up to leave headroom for a median-filter pass.
pub const RESOLUTION_TIERS: [(&str, u32); 4] =
    [("256", 512), ("512", 1024), ("1024", 2048), ("2048", 4096)];

/// Destination storage for a bake result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BakeDomain {
    /// Per-vertex color attribute.
    Vert,
    /// 2D image texture.
    Tex,
}

impl BakeDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            BakeDomain::Vert => "VERT",
            BakeDomain::Tex => "TEX",
        }
    }
}

impl fmt::Display for BakeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing policy derived from a group name.
///
/// A name selects which bake domains run, never how they render. Sample
/// count and denoising are per-domain settings of the run, see
/// [`PipelineConfig::render_settings`](crate::PipelineConfig::render_settings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakePolicy {
    pub join: bool,
    pub unwrap: bool,
    pub vert: bool,
    pub tex: bool,
    pub resolution_tier: u32,
}

impl BakePolicy {
    /// Resolves the policy carried by a group name.
    pub fn resolve(name: &str) -> Self {
        let resolution_tier = RESOLUTION_TIERS
            .iter()
            .find(|(token, _)| name.contains(token))
            .map(|&(_, tier)| tier)
            .unwrap_or(DEFAULT_RESOLUTION_TIER);

        Self {
            join: name.contains(JOIN_TOKEN),
            unwrap: name.contains(UNWRAP_TOKEN),
            vert: name.contains(VERT_TOKEN),
            tex: name.contains(TEX_TOKEN),
            resolution_tier,
        }
    }

    /// Final square image size: tier times multiplier, truncated.
    pub fn resolution(&self, multiplier: f32) -> u32 {
        (f64::from(self.resolution_tier) * f64::from(multiplier)) as u32
    }

    /// Domains to bake, vertex colors first.
    pub fn domains(&self) -> Vec<BakeDomain> {
        let mut domains = Vec::with_capacity(2);
        if self.vert {
            domains.push(BakeDomain::Vert);
        }
        if self.tex {
            domains.push(BakeDomain::Tex);
        }
        domains
    }
}

/// Root category sweep a group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Props,
    Arch,
}

impl Category {
    /// Sweep order.
    pub const ORDER: [Category; 2] = [Category::Props, Category::Arch];

    pub fn token(&self) -> &'static str {
        match self {
            Category::Props => PROPS_TOKEN,
            Category::Arch => ARCH_TOKEN,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name.contains(self.token())
    }
}

/// Whether a root group gets the permanent vertex-color preview shader.
pub fn wants_vertex_preview(root_name: &str) -> bool {
    Category::Props.matches(root_name) && root_name.contains(VERT_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_tokens() {
        let policy = BakePolicy::resolve("PROPS_JOIN_UNWRAP_TEX_512");
        assert_eq!(
            policy,
            BakePolicy {
                join: true,
                unwrap: true,
                vert: false,
                tex: true,
                resolution_tier: 1024,
            }
        );
        assert_eq!(policy.resolution(2.0), 2048);
    }

    #[test]
    fn test_tokens_are_case_sensitive() {
        let policy = BakePolicy::resolve("props_join_tex");
        assert!(!policy.join);
        assert!(!policy.tex);
        assert_eq!(policy.resolution_tier, DEFAULT_RESOLUTION_TIER);
    }

    #[test]
    fn test_resolution_tier_priority() {
        assert_eq!(BakePolicy::resolve("TEX").resolution_tier, 1024);
        assert_eq!(BakePolicy::resolve("TEX_256").resolution_tier, 512);
        assert_eq!(BakePolicy::resolve("TEX_1024").resolution_tier, 2048);
        assert_eq!(BakePolicy::resolve("TEX_2048").resolution_tier, 4096);
        // "2560" contains "256", which is checked first.
        assert_eq!(BakePolicy::resolve("TEX_2560").resolution_tier, 512);
    }

    #[test]
    fn test_resolution_truncates() {
        let policy = BakePolicy::resolve("TEX_256");
        assert_eq!(policy.resolution(1.5), 768);
        assert_eq!(policy.resolution(0.333), 170);
    }

    #[test]
    fn test_domains() {
        assert_eq!(
            BakePolicy::resolve("VERT_TEX").domains(),
            vec![BakeDomain::Vert, BakeDomain::Tex]
        );
        assert!(BakePolicy::resolve("ARCH").domains().is_empty());
    }

    #[test]
    fn test_categories() {
        assert!(Category::Props.matches("PROPS_VERT"));
        assert!(Category::Arch.matches("ARCH_TEX"));
        assert!(!Category::Arch.matches("arch"));
        assert!(wants_vertex_preview("PROPS_VERT"));
        assert!(!wants_vertex_preview("ARCH_VERT"));
    }
}
