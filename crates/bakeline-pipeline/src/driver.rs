//! Whole-scene driver: category sweeps over root groups and the preview pass.

use std::path::Path;

use bakeline_scene::{GroupId, Scene};

use crate::backend::SceneBackend;
use crate::config::PipelineConfig;
use crate::consolidate::{consolidate, EmissionSource};
use crate::context::PipelineContext;
use crate::error::PipelineResult;
use crate::materials::ensure_material;
use crate::normalize::normalize_object;
use crate::passes::{texture_pass, vertex_pass};
use crate::policy::{wants_vertex_preview, BakePolicy, Category};
use crate::report::{PipelineEvent, PipelineReport};
use crate::topology::layout_group;

/// One pipeline run over a scene.
///
/// Holds the selection context for the whole run; every operation goes
/// through it, so the run is strictly sequential.
pub struct Pipeline<'a, B: SceneBackend + ?Sized> {
    scene: &'a mut Scene,
    backend: &'a mut B,
    config: PipelineConfig,
    ctx: PipelineContext,
    report: PipelineReport,
}

impl<'a, B: SceneBackend + ?Sized> Pipeline<'a, B> {
    pub fn new(scene: &'a mut Scene, backend: &'a mut B, config: PipelineConfig) -> Self {
        Self {
            scene,
            backend,
            config,
            ctx: PipelineContext::new(),
            report: PipelineReport::new(),
        }
    }

    /// Processes every PROPS root, then every ARCH root, then installs the
    /// vertex-color preview shaders when preview mode is on.
    ///
    /// Fails before touching the scene if the config is invalid or the scene
    /// has no directory on disk. Any later failure aborts the run and leaves
    /// the scene partially processed.
    pub fn run(mut self) -> PipelineResult<PipelineReport> {
        self.config.validate()?;
        let base_dir = self.scene.base_dir()?;
        self.scene.validate()?;

        let roots = self.scene.root_groups();
        for category in Category::ORDER {
            for &root in &roots {
                if category.matches(&self.scene.group(root)?.name) {
                    tracing::info!(
                        "processing {} root '{}'",
                        category.token(),
                        self.scene.group(root)?.name
                    );
                    self.full_process(root, &base_dir)?;
                }
            }
        }

        if self.config.preview_mode {
            for &root in &roots {
                if wants_vertex_preview(&self.scene.group(root)?.name) {
                    self.install_preview(root)?;
                }
            }
        }
        Ok(self.report)
    }

    /// Normalize, lay out and bake `root` and then each group below it.
    fn full_process(&mut self, root: GroupId, base_dir: &Path) -> PipelineResult<()> {
        let root_name = self.scene.group(root)?.name.clone();
        let root_policy = BakePolicy::resolve(&root_name);

        for group in std::iter::once(root).chain(self.scene.descendants(root)) {
            for object in self.scene.mesh_members_recursive(group)? {
                normalize_object(
                    self.scene,
                    self.backend,
                    &mut self.ctx,
                    &mut self.report,
                    object,
                )?;
            }

            let own = BakePolicy::resolve(&self.scene.group(group)?.name);
            layout_group(
                self.scene,
                self.backend,
                &mut self.ctx,
                &mut self.report,
                group,
                &own,
            )?;
            self.process_group(group, &root_name, &root_policy, base_dir)?;
        }
        Ok(())
    }

    /// Lays the group out again and bakes its direct members.
    ///
    /// Join and unwrap follow the group's own name; bake domains and
    /// resolution follow the root's.
    fn process_group(
        &mut self,
        group: GroupId,
        root_name: &str,
        root_policy: &BakePolicy,
        base_dir: &Path,
    ) -> PipelineResult<()> {
        let name = self.scene.group(group)?.name.clone();
        let own = BakePolicy::resolve(&name);
        let policy = BakePolicy {
            join: own.join,
            unwrap: own.unwrap,
            ..*root_policy
        };
        self.report.push(PipelineEvent::GroupStarted {
            group: name,
            root: root_name.to_string(),
            policy,
        });

        layout_group(
            self.scene,
            self.backend,
            &mut self.ctx,
            &mut self.report,
            group,
            &policy,
        )?;

        for object in self.scene.mesh_members(group)? {
            tracing::debug!("processing '{}'", self.scene.object(object)?.name);
            ensure_material(self.scene, &mut self.report, object)?;
            if policy.vert {
                vertex_pass(
                    self.scene,
                    self.backend,
                    &mut self.ctx,
                    &mut self.report,
                    &self.config,
                    object,
                )?;
            }
            if policy.tex {
                texture_pass(
                    self.scene,
                    self.backend,
                    &mut self.ctx,
                    &mut self.report,
                    &self.config,
                    base_dir,
                    &policy,
                    object,
                )?;
            }
        }
        Ok(())
    }

    /// Swaps the materials of every mesh under `root` for an emission shader
    /// reading the baked vertex colors.
    fn install_preview(&mut self, root: GroupId) -> PipelineResult<()> {
        for group in std::iter::once(root).chain(self.scene.descendants(root)) {
            for object in self.scene.mesh_members(group)? {
                let material = consolidate(self.scene, object, EmissionSource::VertexColor)?;
                let object = self.scene.object(object)?.name.clone();
                let material = self.scene.material(material)?.name.clone();
                tracing::debug!("installed vertex color preview on '{}'", object);
                self.report
                    .push(PipelineEvent::PreviewInstalled { object, material });
            }
        }
        Ok(())
    }
}

/// Runs the pipeline over `scene` with `backend`.
pub fn run<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    config: PipelineConfig,
) -> PipelineResult<PipelineReport> {
    Pipeline::new(scene, backend, config).run()
}
