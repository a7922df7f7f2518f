//! Ambient effect toggle: a decorative marker class on one container,
//! independent of any dialogue.

use crate::api::types::ElementKey;
use crate::bridge::surface::{classes, Outbox, SurfaceOp};

#[derive(Debug, Default)]
pub struct AmbientToggle {
    zone: Option<ElementKey>,
    active: bool,
}

impl AmbientToggle {
    pub fn new(zone: Option<ElementKey>) -> Self {
        Self { zone, active: false }
    }

    /// Mark the effect active. No-op when already active or when no zone
    /// is configured. Returns true if the state changed.
    pub fn start(&mut self, out: &mut Outbox) -> bool {
        let Some(zone) = &self.zone else {
            return false;
        };
        if self.active {
            return false;
        }
        self.active = true;
        out.push(SurfaceOp::AddClass {
            target: zone.clone(),
            class: classes::SHOW_BUBBLES,
        });
        true
    }

    /// Reverse `start`. Returns true if the state changed.
    pub fn stop(&mut self, out: &mut Outbox) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        if let Some(zone) = &self.zone {
            out.push(SurfaceOp::RemoveClass {
                target: zone.clone(),
                class: classes::SHOW_BUBBLES,
            });
        }
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
