//! Registry mapping each geometry kind to its draw tool.

use super::{DrawTool, ToolError, ToolKind, ToolResult};

/// Fixed-size table of draw tools, indexed by [`ToolKind`].
///
/// Activation through the registry is the only place that guarantees at
/// most one tool is active.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: [Option<DrawTool>; ToolKind::COUNT],
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store an inactive tool for `kind`.
    ///
    /// A tool already registered for `kind` is dropped along with any
    /// gesture it had in progress.
    pub fn register(&mut self, kind: ToolKind) -> &mut DrawTool {
        let slot = &mut self.tools[kind.index()];
        if slot.is_some() {
            log::debug!("Replacing {} tool", kind);
        }
        slot.insert(DrawTool::new(kind))
    }

    /// Activate `kind` and deactivate every other tool.
    ///
    /// An unregistered kind changes nothing.
    pub fn activate(&mut self, kind: ToolKind) -> ToolResult<()> {
        if !self.is_registered(kind) {
            log::warn!("Cannot activate unregistered tool {}", kind);
            return Err(ToolError::NotFound(kind));
        }
        for tool in self.tools.iter_mut().flatten() {
            tool.set_active(tool.kind() == kind);
        }
        Ok(())
    }

    /// Deactivate every tool, discarding partial geometry.
    pub fn deactivate_all(&mut self) {
        for tool in self.tools.iter_mut().flatten() {
            tool.set_active(false);
        }
    }

    pub fn get(&self, kind: ToolKind) -> ToolResult<&DrawTool> {
        self.tools[kind.index()].as_ref().ok_or(ToolError::NotFound(kind))
    }

    pub fn get_mut(&mut self, kind: ToolKind) -> ToolResult<&mut DrawTool> {
        self.tools[kind.index()].as_mut().ok_or(ToolError::NotFound(kind))
    }

    pub fn is_registered(&self, kind: ToolKind) -> bool {
        self.tools[kind.index()].is_some()
    }

    /// The active tool, if any.
    pub fn active(&self) -> Option<&DrawTool> {
        self.tools.iter().flatten().find(|t| t.is_active())
    }

    pub fn active_mut(&mut self) -> Option<&mut DrawTool> {
        self.tools.iter_mut().flatten().find(|t| t.is_active())
    }

    /// Number of active tools. Never more than one.
    pub fn active_count(&self) -> usize {
        self.tools.iter().flatten().filter(|t| t.is_active()).count()
    }

    /// Registered kinds, in [`ToolKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = ToolKind> + '_ {
        self.tools.iter().flatten().map(DrawTool::kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawTool> {
        self.tools.iter().flatten()
    }

    /// Set the polygon-closing tolerance on every registered tool.
    pub fn set_snap_tolerance(&mut self, tolerance: f64) {
        for tool in self.tools.iter_mut().flatten() {
            tool.snap_tolerance = tolerance;
        }
    }

    pub fn len(&self) -> usize {
        self.tools.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
