//! Geometry adapter: monitor identifiers to compositor-space rectangles.
//!
//! Monitor discovery itself is external; this module only defines what the
//! core needs from it and provides a static, in-memory implementation.

use serde::{Deserialize, Serialize};

use crate::params::RegionRect;

/// One logical display, possibly mirrored across several connectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalMonitor {
    /// Stable identifier: the first connector as reported by the display server.
    pub id: String,
    /// Connector names, sorted.
    pub connectors: Vec<String>,
}

impl LogicalMonitor {
    /// Build from connectors in reported order. Returns `None` if empty.
    pub fn from_connectors<I, S>(connectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut connectors: Vec<String> = connectors.into_iter().map(Into::into).collect();
        let id = connectors.first()?.clone();
        connectors.sort();
        Some(Self { id, connectors })
    }

    /// Whether `identifier` names one of this monitor's connectors.
    pub fn owns(&self, identifier: &str) -> bool {
        self.connectors.iter().any(|c| c == identifier)
    }

    /// Human-readable label, e.g. `"2: DP-1, DP-2"` for the second monitor.
    pub fn label(&self, position: usize) -> String {
        format!("{}: {}", position + 1, self.connectors.join(", "))
    }
}

/// What the core needs to know about the current display layout.
pub trait GeometryAdapter {
    /// Rectangle of the monitor owning `identifier`, or `None` if it is not
    /// currently connected.
    fn monitor_rect(&self, identifier: &str) -> Option<RegionRect>;

    /// Total compositor output size in pixels.
    fn compositor_size(&self) -> [f32; 2];

    /// Currently connected logical monitors, in reported order.
    fn logical_monitors(&self) -> Vec<LogicalMonitor>;
}

/// A fixed layout, e.g. from a display-configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticLayout {
    monitors: Vec<(LogicalMonitor, RegionRect)>,
    size: Option<[f32; 2]>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monitor. Order of insertion is the reported monitor order.
    pub fn with_monitor(mut self, monitor: LogicalMonitor, rect: RegionRect) -> Self {
        self.monitors.push((monitor, rect));
        self
    }

    /// Override the compositor size instead of deriving it from the rectangles.
    pub fn with_compositor_size(mut self, size: [f32; 2]) -> Self {
        self.size = Some(size);
        self
    }

    /// Disconnect the monitor owning `identifier`. Returns whether one was removed.
    pub fn remove(&mut self, identifier: &str) -> bool {
        let before = self.monitors.len();
        self.monitors.retain(|(m, _)| !m.owns(identifier));
        self.monitors.len() != before
    }
}

impl GeometryAdapter for StaticLayout {
    fn monitor_rect(&self, identifier: &str) -> Option<RegionRect> {
        self.monitors
            .iter()
            .find(|(m, _)| m.owns(identifier))
            .map(|(_, rect)| *rect)
    }

    /// Explicit size if set, else the origin-anchored bounding box.
    fn compositor_size(&self) -> [f32; 2] {
        if let Some(size) = self.size {
            return size;
        }
        self.monitors.iter().fold([0.0, 0.0], |acc, (_, r)| {
            [acc[0].max(r.x + r.width), acc[1].max(r.y + r.height)]
        })
    }

    fn logical_monitors(&self) -> Vec<LogicalMonitor> {
        self.monitors.iter().map(|(m, _)| m.clone()).collect()
    }
}
