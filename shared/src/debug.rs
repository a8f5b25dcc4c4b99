//! Debug visualization hooks.
//!
//! The stepper reports what it sampled and decided through a [`DebugSink`]. The server and
//! tests pass [`NullSink`]; the client draws gizmos from the same events.

use crate::{
    handle::SourceHandle,
    status::ContactState,
    utils::{Quat, Vec3},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DebugEvent {
    GravitySample {
        origin: Vec3,
        vector: Vec3,
        impact: Option<Vec3>,
        source: Option<SourceHandle>,
    },
    Sweep {
        from: Vec3,
        to: Vec3,
        radius: f32,
        hit: Option<Vec3>,
    },
    EdgeProbe {
        from: Vec3,
        to: Vec3,
        supported: bool,
    },
    Orientation {
        position: Vec3,
        from: Quat,
        to: Quat,
    },
    ContactChanged {
        position: Vec3,
        from: ContactState,
        to: ContactState,
    },
}

pub trait DebugSink {
    fn record(&mut self, event: DebugEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn record(&mut self, _event: DebugEvent) {}
}

/// Forwards events to the `log` facade at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DebugSink for LogSink {
    fn record(&mut self, event: DebugEvent) {
        log::debug!("{event:?}");
    }
}

/// Buffers events for later inspection.
impl DebugSink for Vec<DebugEvent> {
    fn record(&mut self, event: DebugEvent) {
        self.push(event);
    }
}
