//! Interaction coordinator: the state machine tying tools, selection and
//! the feature store together.
//!
//! All mutable editing state lives here and is only changed through
//! [`InteractionCoordinator::dispatch`] or the named transitions it calls.
//!
//! ```text
//! Idle ──tool──▶ Drawing(kind) ──draw end──▶ Idle
//!  │  ◀──────────────tool(None)──────────┘
//!  ├──delete──▶ Deleting ──select (non-empty)──▶ Idle
//!  └──select──▶ Selecting
//! ```

use crate::feature::{Feature, FeatureId};
use crate::input::MapInput;
use crate::selection::{SelectEvent, Selection};
use crate::store::FeatureStore;
use crate::tools::{DrawSignal, ToolKind, ToolRegistry, ToolResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default pick tolerance, in map units, when no view is involved.
pub const DEFAULT_HIT_TOLERANCE: f64 = 1.0;

/// Top-level editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Idle,
    Drawing(ToolKind),
    Selecting,
    /// Selecting with removal of the picked features.
    Deleting,
}

/// A state change caused by an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    ModeChanged { from: Mode, to: Mode },
    DrawStarted(ToolKind),
    FeatureAdded(FeatureId),
    FeaturesRemoved(Vec<FeatureId>),
    SelectionChanged(SelectEvent),
}

/// Owns the feature store, the tool registry and the selection mechanism.
#[derive(Debug, Clone)]
pub struct InteractionCoordinator {
    store: FeatureStore,
    tools: ToolRegistry,
    selection: Selection,
    mode: Mode,
    delete_feature_mode: bool,
    /// Pick and polygon-closing tolerance in map units.
    hit_tolerance: f64,
}

impl Default for InteractionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionCoordinator {
    pub fn new() -> Self {
        Self {
            store: FeatureStore::new(),
            tools: ToolRegistry::new(),
            selection: Selection::new(),
            mode: Mode::Idle,
            delete_feature_mode: false,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
        }
    }

    /// Create a coordinator with one inactive tool per kind.
    pub fn with_tools(kinds: impl IntoIterator<Item = ToolKind>) -> Self {
        let mut coordinator = Self::new();
        for kind in kinds {
            coordinator.register_tool(kind);
        }
        coordinator
    }

    pub fn register_tool(&mut self, kind: ToolKind) {
        self.tools.register(kind).snap_tolerance = self.hit_tolerance;
        if self.mode == Mode::Drawing(kind) {
            // The replacement starts inactive.
            self.set_mode(Mode::Idle);
        }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    /// Mutable store access for hosts that load or edit features directly.
    pub fn store_mut(&mut self) -> &mut FeatureStore {
        &mut self.store
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn delete_feature_mode(&self) -> bool {
        self.delete_feature_mode
    }

    pub fn hit_tolerance(&self) -> f64 {
        self.hit_tolerance
    }

    /// Set the pick tolerance (map units). Typically pixels × view resolution.
    pub fn set_hit_tolerance(&mut self, tolerance: f64) {
        self.hit_tolerance = tolerance;
        self.tools.set_snap_tolerance(tolerance);
    }

    fn set_mode(&mut self, mode: Mode) -> Option<Change> {
        let from = self.mode;
        if from == mode {
            return None;
        }
        if matches!(from, Mode::Selecting | Mode::Deleting) {
            self.selection.clear();
        }
        self.mode = mode;
        log::debug!("Mode {:?} -> {:?}", from, mode);
        Some(Change::ModeChanged { from, to: mode })
    }

    /// Route one input to the right transition.
    ///
    /// Errors leave the state untouched.
    pub fn dispatch(&mut self, input: MapInput) -> ToolResult<Vec<Change>> {
        let changes = match input {
            MapInput::ToolClicked(kind) => self.select_tool(kind)?,
            MapInput::DeleteClicked => self.delete_feature_activated(),
            MapInput::SelectClicked => self.activate_selection(),
            MapInput::Cancel => self.cancel(),
            MapInput::Click(point) => self.click(point),
            MapInput::DoubleClick(point) => self.double_click(point),
            MapInput::PointerMove(point) => {
                if let Some(tool) = self.tools.active_mut() {
                    tool.pointer_move(point);
                }
                Vec::new()
            }
            MapInput::Finish => {
                let signals = self.tools.active_mut().and_then(|t| t.finish());
                self.handle_draw_signals(signals.into_iter().collect())
            }
        };
        Ok(changes)
    }

    /// Deactivate every draw tool, then activate `kind` if given.
    ///
    /// Used both for tool buttons and for returning to the pointer after a
    /// shape is finished. Leaving delete or select mode this way clears the
    /// delete flag and the selection.
    pub fn select_tool(&mut self, kind: Option<ToolKind>) -> ToolResult<Vec<Change>> {
        if let Some(kind) = kind {
            if !self.tools.is_registered(kind) {
                log::warn!("Ignoring click on unregistered tool {}", kind);
                return Err(crate::tools::ToolError::NotFound(kind));
            }
        }

        self.tools.deactivate_all();
        self.selection.deactivate();
        self.delete_feature_mode = false;

        let target = match kind {
            Some(kind) => {
                self.tools.activate(kind)?;
                Mode::Drawing(kind)
            }
            None => Mode::Idle,
        };
        Ok(self.set_mode(target).into_iter().collect())
    }

    /// Turn every draw tool off. Drawing returns to Idle.
    pub fn disable_all_draw_features(&mut self) -> Vec<Change> {
        self.tools.deactivate_all();
        match self.mode {
            Mode::Drawing(_) => self.set_mode(Mode::Idle).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Enter delete mode: the next click on a feature removes it.
    pub fn delete_feature_activated(&mut self) -> Vec<Change> {
        self.tools.deactivate_all();
        self.delete_feature_mode = true;
        self.selection.activate();
        self.set_mode(Mode::Deleting).into_iter().collect()
    }

    /// Enter plain selection mode.
    pub fn activate_selection(&mut self) -> Vec<Change> {
        self.tools.deactivate_all();
        self.delete_feature_mode = false;
        self.selection.activate();
        self.set_mode(Mode::Selecting).into_iter().collect()
    }

    /// Leave any mode for Idle.
    pub fn cancel(&mut self) -> Vec<Change> {
        self.tools.deactivate_all();
        self.selection.deactivate();
        self.delete_feature_mode = false;
        self.set_mode(Mode::Idle).into_iter().collect()
    }

    fn click(&mut self, point: Point) -> Vec<Change> {
        if let Some(tool) = self.tools.active_mut() {
            let signals = tool.click(point);
            return self.handle_draw_signals(signals);
        }
        match self.selection.click(&self.store, point, self.hit_tolerance) {
            Some(event) => self.on_select(event),
            None => Vec::new(),
        }
    }

    fn double_click(&mut self, point: Point) -> Vec<Change> {
        match self.tools.active_mut() {
            Some(tool) => {
                let signals = tool.double_click(point);
                self.handle_draw_signals(signals)
            }
            None => self.click(point),
        }
    }

    fn handle_draw_signals(&mut self, signals: Vec<DrawSignal>) -> Vec<Change> {
        let mut changes = Vec::new();
        for signal in signals {
            match signal {
                DrawSignal::Start => changes.extend(self.on_draw_start()),
                DrawSignal::End(geometry) => changes.extend(self.on_draw_end(Feature::new(geometry))),
            }
        }
        changes
    }

    /// A draw gesture began: selection must not pick up the shape in progress.
    pub fn on_draw_start(&mut self) -> Vec<Change> {
        self.selection.deactivate();
        match self.tools.active() {
            Some(tool) => vec![Change::DrawStarted(tool.kind())],
            None => Vec::new(),
        }
    }

    /// A draw gesture completed: store the feature and return to Idle.
    pub fn on_draw_end(&mut self, feature: Feature) -> Vec<Change> {
        let mut changes = Vec::new();
        match self.store.add(feature) {
            Ok(id) => changes.push(Change::FeatureAdded(id)),
            Err(e) => log::warn!("Dropping drawn feature: {}", e),
        }
        // Always registered-or-none, so this cannot fail.
        if let Ok(more) = self.select_tool(None) {
            changes.extend(more);
        }
        changes
    }

    /// Apply a selection event according to the current mode.
    pub fn on_select(&mut self, event: SelectEvent) -> Vec<Change> {
        match self.mode {
            Mode::Deleting if self.delete_feature_mode => self.delete_selected(event),
            Mode::Selecting => vec![Change::SelectionChanged(event)],
            _ => Vec::new(),
        }
    }

    fn delete_selected(&mut self, event: SelectEvent) -> Vec<Change> {
        if event.selected.is_empty() {
            // Must click directly on a feature.
            return Vec::new();
        }

        // The store refuses to remove features that are still selected.
        self.selection.clear();
        let mut removed = Vec::with_capacity(event.selected.len());
        for id in event.selected {
            match self.store.remove_unselected(id, self.selection.selected()) {
                Ok(_) => removed.push(id),
                Err(e) => log::warn!("Could not delete feature: {}", e),
            }
        }
        self.store.refresh();
        self.delete_feature_mode = false;
        self.selection.deactivate();
        log::info!("Deleted {} feature(s)", removed.len());

        let mut changes = vec![Change::FeaturesRemoved(removed)];
        changes.extend(self.set_mode(Mode::Idle));
        changes
    }

    /// At most one draw tool is active and never together with the selection.
    /// The delete flag only exists in Deleting, and the mode names whichever
    /// of the two is on.
    pub fn invariants_hold(&self) -> bool {
        let tools_active = self.tools.active_count();
        let mode_agrees = match self.mode {
            Mode::Drawing(kind) => self.tools.active().map(|t| t.kind()) == Some(kind),
            Mode::Idle => tools_active == 0 && !self.selection.is_active(),
            Mode::Selecting | Mode::Deleting => tools_active == 0 && self.selection.is_active(),
        };
        tools_active <= 1
            && !(tools_active == 1 && self.selection.is_active())
            && (!self.delete_feature_mode || self.mode == Mode::Deleting)
            && mode_agrees
    }
}
