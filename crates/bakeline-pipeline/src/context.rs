//! Explicit selection state threaded through every pipeline operation.

use bakeline_scene::ObjectId;

/// The active object and the current selection.
///
/// Backends only ever see what this context says is selected; nothing about
/// selection is stored on the scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineContext {
    active: Option<ObjectId>,
    selection: Vec<ObjectId>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Selected objects in selection order.
    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn is_selected(&self, object: ObjectId) -> bool {
        self.selection.contains(&object)
    }

    /// Clears the selection and the active object.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
        self.active = None;
    }

    pub fn select(&mut self, object: ObjectId) {
        if !self.is_selected(object) {
            self.selection.push(object);
        }
    }

    /// Drops an object that no longer exists.
    pub fn forget(&mut self, object: ObjectId) {
        self.selection.retain(|&o| o != object);
        if self.active == Some(object) {
            self.active = None;
        }
    }

    pub fn set_active(&mut self, object: ObjectId) {
        self.select(object);
        self.active = Some(object);
    }

    /// Selects exactly `object` and makes it active.
    pub fn select_only(&mut self, object: ObjectId) {
        self.deselect_all();
        self.set_active(object);
    }

    /// Selects `objects` with the first one active.
    pub fn select_group(&mut self, objects: &[ObjectId]) {
        self.deselect_all();
        for &object in objects {
            self.select(object);
        }
        if let Some(&first) = objects.first() {
            self.active = Some(first);
        }
    }
}
