//! Run report: the ordered record of what a pipeline run did.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backend::UnwrapParams;
use crate::bake::PassKind;
use crate::policy::{BakeDomain, BakePolicy};

/// One step taken by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    GroupStarted {
        group: String,
        root: String,
        policy: BakePolicy,
    },
    Normalized {
        object: String,
        modifiers_applied: Vec<String>,
        scale_applied: bool,
        detached_mesh: bool,
    },
    Merged {
        into: String,
        removed: Vec<String>,
    },
    Unwrapped {
        objects: Vec<String>,
        params: UnwrapParams,
    },
    MaterialCreated {
        object: String,
        material: String,
    },
    Baked {
        object: String,
        pass: PassKind,
        domain: BakeDomain,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolution: Option<u32>,
        samples: u32,
        denoise: bool,
    },
    ImageSaved {
        object: String,
        path: PathBuf,
    },
    Consolidated {
        object: String,
        material: String,
    },
    PreviewInstalled {
        object: String,
        material: String,
    },
}

/// Events of one run, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub events: Vec<PipelineEvent>,
}

impl PipelineReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }

    /// Unwrap passes, in order.
    pub fn unwraps(&self) -> impl Iterator<Item = (&[String], &UnwrapParams)> {
        self.events.iter().filter_map(|e| match e {
            PipelineEvent::Unwrapped { objects, params } => Some((objects.as_slice(), params)),
            _ => None,
        })
    }

    /// Bakes as `(object, pass, domain)`, in order.
    pub fn bakes(&self) -> impl Iterator<Item = (&str, PassKind, BakeDomain)> {
        self.events.iter().filter_map(|e| match e {
            PipelineEvent::Baked {
                object,
                pass,
                domain,
                ..
            } => Some((object.as_str(), *pass, *domain)),
            _ => None,
        })
    }

    /// Paths of saved images, in order.
    pub fn saved_images(&self) -> impl Iterator<Item = &PathBuf> {
        self.events.iter().filter_map(|e| match e {
            PipelineEvent::ImageSaved { path, .. } => Some(path),
            _ => None,
        })
    }

    /// Groups in processing order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            PipelineEvent::GroupStarted { group, .. } => Some(group.as_str()),
            _ => None,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
