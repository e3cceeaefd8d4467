//! Active-lesson binding.
//!
//! At most one controller is live. Opening a lesson tears the previous
//! binding down first, and element events are tagged with the binding id
//! they were subscribed under, so callbacks from a replaced element are
//! dropped instead of leaking into the new state.

use tracing::{debug, info};
use uuid::Uuid;

use super::controller::{MediaElement, MediaEvent, PlaybackController, PlaybackSettings};
use crate::domain::{Resource, ResourceId};

/// Identifies one element/controller binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(Uuid);

impl BindingId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Binding<E: MediaElement> {
    id: BindingId,
    resource: ResourceId,
    controller: PlaybackController<E>,
}

/// Holds the lesson currently open in the detail view
pub struct LessonSession<E: MediaElement> {
    settings: PlaybackSettings,
    active: Option<Binding<E>>,
}

impl<E: MediaElement> LessonSession<E> {
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            active: None,
        }
    }

    /// Open `resource` on `element`, replacing any current binding.
    /// Returns the id events for this element must carry.
    pub fn open(&mut self, resource: &Resource, element: E) -> BindingId {
        self.close();

        let id = BindingId::new();
        let controller = PlaybackController::new(element, resource.playback_url(), self.settings);
        info!(binding = %id, lesson = %resource.id, "Lesson opened");

        self.active = Some(Binding {
            id,
            resource: resource.id.clone(),
            controller,
        });
        id
    }

    /// Tear down the current binding, returning its element
    pub fn close(&mut self) -> Option<E> {
        self.active.take().map(|binding| {
            debug!(binding = %binding.id, "Lesson closed");
            binding.controller.into_element()
        })
    }

    /// Deliver an element event. Events from stale bindings are dropped.
    pub fn dispatch(&mut self, binding: BindingId, event: MediaEvent) -> bool {
        match self.active.as_mut() {
            Some(active) if active.id == binding => {
                active.controller.handle(event);
                true
            }
            _ => {
                debug!(binding = %binding, ?event, "Dropping event from stale binding");
                false
            }
        }
    }

    pub fn binding(&self) -> Option<BindingId> {
        self.active.as_ref().map(|b| b.id)
    }

    pub fn lesson(&self) -> Option<&ResourceId> {
        self.active.as_ref().map(|b| &b.resource)
    }

    pub fn controller(&self) -> Option<&PlaybackController<E>> {
        self.active.as_ref().map(|b| &b.controller)
    }

    pub fn controller_mut(&mut self) -> Option<&mut PlaybackController<E>> {
        self.active.as_mut().map(|b| &mut b.controller)
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.settings
    }
}
