//! Mouse input
//!
//! Input dispatched at viewport coordinates is hit-tested against the
//! layout, recorded, and broadcast to subscribers. Moving the mouse updates
//! the hovered element, which drives the `:hover` pseudo-class.

use cdp_types::domains::dom::NodeId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::document::Document;

/// Kind of a dispatched mouse event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventKind {
    MouseMoved,
    MousePressed,
    MouseReleased,
    Click,
}

/// A mouse event as delivered to the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MouseEvent {
    #[serde(rename = "type")]
    pub kind: MouseEventKind,
    /// Element under the pointer, if any
    pub target: Option<NodeId>,
    pub x: f64,
    pub y: f64,
}

impl Document {
    /// Dispatch a mouse event at viewport coordinates `(x, y)`
    pub fn dispatch_mouse_event(&self, kind: MouseEventKind, x: f64, y: f64) -> MouseEvent {
        let target = self.element_from_point(x, y);
        if kind == MouseEventKind::MouseMoved {
            *self.hovered.write() = target;
        }

        let event = MouseEvent { kind, target, x, y };
        debug!("Dispatching {:?} at ({}, {}) to {:?}", kind, x, y, target);
        self.event_log.lock().push(event.clone());
        if self.event_sender.send(event.clone()).is_err() {
            trace!("No event subscribers for {:?}", kind);
        }
        event
    }

    /// Events dispatched so far, oldest first
    pub fn events(&self) -> Vec<MouseEvent> {
        self.event_log.lock().clone()
    }

    pub fn clear_events(&self) {
        self.event_log.lock().clear();
    }

    /// Subscribe to events dispatched after this call
    pub fn subscribe_events(&self) -> broadcast::Receiver<MouseEvent> {
        self.event_sender.subscribe()
    }

    /// Element the mouse was last moved over
    pub fn hovered(&self) -> Option<NodeId> {
        *self.hovered.read()
    }
}
