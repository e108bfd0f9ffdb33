// Focus orchestration: confirmed gestures -> whole-snapshot UI instructions.
// Four-gesture profile drives single-panel focus; two-gesture profile drives UI visibility.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::types::*;

/// Per-panel dim flags plus the focused panel. Always covers every known panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusInstruction {
    pub current_focus: Option<PanelId>,
    pub dimmed: BTreeMap<PanelId, bool>,
}

impl FocusInstruction {
    /// Idle view: nothing focused, nothing dimmed.
    pub fn cleared() -> Self {
        FocusInstruction {
            current_focus: None,
            dimmed: PanelId::ALL.iter().map(|p| (*p, false)).collect(),
        }
    }

    /// `panel` undimmed, every other panel dimmed.
    pub fn focused(panel: PanelId) -> Self {
        FocusInstruction {
            current_focus: Some(panel),
            dimmed: PanelId::ALL.iter().map(|p| (*p, *p != panel)).collect(),
        }
    }

    pub fn is_dimmed(&self, panel: PanelId) -> bool {
        self.dimmed.get(&panel).copied().unwrap_or(false)
    }
}

impl Default for FocusInstruction {
    fn default() -> Self {
        Self::cleared()
    }
}

/// Whole-UI visibility for the mirror-mode consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VisibilityInstruction {
    pub hidden: bool,
}

/// What the UI layer applies. Published as a whole, never field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    Focus(FocusInstruction),
    Visibility(VisibilityInstruction),
}

impl Instruction {
    pub fn initial(profile: GestureProfile) -> Self {
        match profile {
            GestureProfile::FourGesture => Instruction::Focus(FocusInstruction::cleared()),
            GestureProfile::TwoGesture => Instruction::Visibility(VisibilityInstruction::default()),
        }
    }
}

/// Single-focus panel model.
#[derive(Debug, Clone)]
pub struct FocusOrchestrator {
    panel_order: Vec<PanelId>,
    current: FocusInstruction,
}

impl FocusOrchestrator {
    /// `panel_order` is the `two_fingers` cycle and must name at least one panel.
    pub fn new(panel_order: Vec<PanelId>) -> Result<Self, EngineError> {
        if panel_order.is_empty() {
            return Err(EngineError::InvalidConfig(
                "panel_order must name at least one panel".to_string(),
            ));
        }
        Ok(FocusOrchestrator {
            panel_order,
            current: FocusInstruction::cleared(),
        })
    }

    pub fn current_focus(&self) -> Option<PanelId> {
        self.current.current_focus
    }

    pub fn instruction(&self) -> &FocusInstruction {
        &self.current
    }

    /// Apply a confirmed gesture. Labels outside the four-gesture table leave state alone.
    pub fn apply(&mut self, gesture: &ConfirmedGesture) -> Option<FocusInstruction> {
        let next = match gesture.label {
            GestureLabel::Open => FocusInstruction::cleared(),
            GestureLabel::Fist => FocusInstruction::focused(PanelId::Calendar),
            GestureLabel::ThumbsUp => FocusInstruction::focused(PanelId::Weather),
            GestureLabel::TwoFingers => FocusInstruction::focused(self.next_in_cycle()),
            GestureLabel::None => return None,
        };
        info!(
            gesture = gesture.label.as_str(),
            focus = next.current_focus.map(|p| p.as_str()).unwrap_or("none"),
            "Panel focus changed"
        );
        self.current = next.clone();
        Some(next)
    }

    /// The panel after the current one in cycle order. Unfocused, or focused on a
    /// panel outside the order, starts from the first entry.
    pub fn next_in_cycle(&self) -> PanelId {
        let position = self
            .current
            .current_focus
            .and_then(|focus| self.panel_order.iter().position(|p| *p == focus));
        let next = position.map_or(0, |i| (i + 1) % self.panel_order.len());
        self.panel_order[next]
    }

    pub fn reset(&mut self) {
        self.current = FocusInstruction::cleared();
    }
}

/// Visible / Hidden toggle for the two-gesture consumer.
#[derive(Debug, Clone, Default)]
pub struct VisibilityOrchestrator {
    hidden: bool,
}

impl VisibilityOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// `open` hides the UI (mirror mode), `fist` shows it. Other labels are ignored.
    pub fn apply(&mut self, gesture: &ConfirmedGesture) -> Option<VisibilityInstruction> {
        let hidden = match gesture.label {
            GestureLabel::Open => true,
            GestureLabel::Fist => false,
            _ => return None,
        };
        if hidden != self.hidden {
            info!(hidden, "UI visibility changed");
        }
        self.hidden = hidden;
        Some(VisibilityInstruction { hidden })
    }

    pub fn reset(&mut self) {
        self.hidden = false;
    }
}

/// The transition table a pipeline runs, picked by profile.
#[derive(Debug, Clone)]
pub enum Orchestrator {
    Panels(FocusOrchestrator),
    Visibility(VisibilityOrchestrator),
}

impl Orchestrator {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, EngineError> {
        Ok(match config.gesture_profile {
            GestureProfile::FourGesture => {
                Orchestrator::Panels(FocusOrchestrator::new(config.panel_order.clone())?)
            }
            GestureProfile::TwoGesture => Orchestrator::Visibility(VisibilityOrchestrator::new()),
        })
    }

    pub fn apply(&mut self, gesture: &ConfirmedGesture) -> Option<Instruction> {
        match self {
            Orchestrator::Panels(o) => o.apply(gesture).map(Instruction::Focus),
            Orchestrator::Visibility(o) => o.apply(gesture).map(Instruction::Visibility),
        }
    }

    /// Current state as a full instruction.
    pub fn instruction(&self) -> Instruction {
        match self {
            Orchestrator::Panels(o) => Instruction::Focus(o.instruction().clone()),
            Orchestrator::Visibility(o) => Instruction::Visibility(VisibilityInstruction {
                hidden: o.is_hidden(),
            }),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Orchestrator::Panels(o) => o.reset(),
            Orchestrator::Visibility(o) => o.reset(),
        }
    }
}
