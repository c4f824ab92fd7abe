//! Bake executor: maps pass kinds onto backend bake requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use bakeline_scene::Scene;

use crate::backend::{BakeOutcome, BakeRequest, BakeTarget, RenderSettings, SceneBackend};
use crate::context::PipelineContext;
use crate::error::BackendResult;

/// What to bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    Color,
    Roughness,
    Normal,
    Emit,
    Combined,
}

impl PassKind {
    pub const ALL: [PassKind; 5] = [
        PassKind::Color,
        PassKind::Roughness,
        PassKind::Normal,
        PassKind::Emit,
        PassKind::Combined,
    ];

    /// Upper-case name used in output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            PassKind::Color => "COLOR",
            PassKind::Roughness => "ROUGHNESS",
            PassKind::Normal => "NORMAL",
            PassKind::Emit => "EMIT",
            PassKind::Combined => "COMBINED",
        }
    }

    /// Renderer bake type and lighting contributions for this pass.
    pub fn pass_filter(&self) -> (BakeType, BTreeSet<Contribution>) {
        use Contribution::*;
        match self {
            PassKind::Roughness => (BakeType::Roughness, BTreeSet::new()),
            PassKind::Color => (BakeType::Diffuse, BTreeSet::from([Color])),
            PassKind::Normal => (BakeType::Normal, BTreeSet::new()),
            PassKind::Emit => (BakeType::Emit, BTreeSet::from([Color])),
            PassKind::Combined => (
                BakeType::Combined,
                BTreeSet::from([Direct, Indirect, Diffuse, Glossy, Transmission, Emit]),
            ),
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renderer-side bake type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BakeType {
    Combined,
    Diffuse,
    Roughness,
    Normal,
    Emit,
}

/// Lighting contribution included in a bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Contribution {
    Direct,
    Indirect,
    Color,
    Diffuse,
    Glossy,
    Transmission,
    Emit,
}

impl BakeRequest {
    /// Builds the request for `pass` into `target`.
    pub fn for_pass(pass: PassKind, target: BakeTarget, settings: RenderSettings) -> Self {
        let (bake_type, contributions) = pass.pass_filter();
        Self {
            pass,
            bake_type,
            contributions,
            target,
            settings,
        }
    }
}

/// Bakes the current selection. Blocks until the backend returns.
pub fn bake<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    ctx: &PipelineContext,
    pass: PassKind,
    target: BakeTarget,
    settings: RenderSettings,
) -> BackendResult<BakeOutcome> {
    let request = BakeRequest::for_pass(pass, target, settings);
    tracing::debug!(
        "bake {:?} ({:?}) -> {:?}, {} samples, denoise={}",
        pass,
        request.bake_type,
        target,
        settings.samples,
        settings.denoise
    );
    backend.bake(scene, ctx, &request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pass_filter_table() {
        use Contribution::*;
        assert_eq!(
            PassKind::Roughness.pass_filter(),
            (BakeType::Roughness, BTreeSet::new())
        );
        assert_eq!(
            PassKind::Color.pass_filter(),
            (BakeType::Diffuse, BTreeSet::from([Color]))
        );
        assert_eq!(
            PassKind::Normal.pass_filter(),
            (BakeType::Normal, BTreeSet::new())
        );
        assert_eq!(
            PassKind::Emit.pass_filter(),
            (BakeType::Emit, BTreeSet::from([Color]))
        );
        let (bake_type, filter) = PassKind::Combined.pass_filter();
        assert_eq!(bake_type, BakeType::Combined);
        assert_eq!(filter.len(), 6);
        assert!(!filter.contains(&Color));
    }

    #[test]
    fn test_pass_names() {
        assert_eq!(PassKind::Combined.to_string(), "COMBINED");
        let pass: PassKind = serde_json::from_str("\"emit\"").unwrap();
        assert_eq!(pass, PassKind::Emit);
    }
}
