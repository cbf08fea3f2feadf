//! Interaction state machine.
//!
//! Turns normalized [`InputEvent`]s into session transitions and store
//! mutations. The controller owns no editing state of its own: mode,
//! selection and labels all live in the [`SessionState`] passed to
//! [`InteractionController::handle`], so a host can drop and rebuild the
//! controller freely.

use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use kurbo::{Point, Rect};
use ov_core::geom::CoordinateMapper;
use ov_core::id::LabelId;
use ov_core::metrics::{ApproxMetrics, TextMetrics};
use ov_core::model::LabelDefaults;
use ov_core::session::{Mode, SessionState};
use ov_core::store::LabelMutation;
use ov_render::hit_test;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Content and style for labels created by a placement click.
    pub defaults: LabelDefaults,
    /// Pointer travel (px) before a held label starts following the pointer.
    /// Shorter presses count as a click.
    pub drag_threshold: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            defaults: LabelDefaults::default(),
            drag_threshold: 3.0,
        }
    }
}

/// What one event did to the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOutcome {
    /// Mode, selection or labels changed; the host should redraw.
    pub changed: bool,
    /// Store edits applied while handling the event, in order.
    pub mutations: Vec<LabelMutation>,
    /// Shortcut resolved from a key event, if any. Host-level actions such
    /// as `Export` are left to the caller.
    pub action: Option<ShortcutAction>,
}

impl EventOutcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    fn merge(mut self, other: EventOutcome) -> Self {
        self.changed |= other.changed;
        self.mutations.extend(other.mutations);
        self.action = other.action.or(self.action);
        self
    }
}

pub struct InteractionController<M = ApproxMetrics> {
    config: ControllerConfig,
    metrics: M,
}

impl Default for InteractionController<ApproxMetrics> {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl InteractionController<ApproxMetrics> {
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_metrics(config, ApproxMetrics)
    }
}

impl<M: TextMetrics> InteractionController<M> {
    pub fn with_metrics(config: ControllerConfig, metrics: M) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ControllerConfig {
        &mut self.config
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: M) {
        self.metrics = metrics;
    }

    /// Topmost label under an image-local point.
    pub fn label_at(&self, session: &SessionState, local: Point) -> Option<LabelId> {
        hit_test(session.labels(), local, &self.metrics)
    }

    /// Label a press lands on. A target named by the host wins over geometry
    /// as long as it still exists; otherwise fall back to hit testing.
    pub fn resolve_target(
        &self,
        session: &SessionState,
        local: Point,
        target: Option<LabelId>,
    ) -> Option<LabelId> {
        match target {
            Some(id) if session.labels().contains(id) => Some(id),
            Some(id) => {
                log::debug!("press target {id:?} is gone; hit testing instead");
                self.label_at(session, local)
            }
            None => self.label_at(session, local),
        }
    }

    /// Apply one input event. `container` is the image container's current
    /// viewport rect, used to map pointer coordinates.
    pub fn handle(
        &self,
        session: &mut SessionState,
        event: &InputEvent,
        container: Rect,
    ) -> EventOutcome {
        let recovered = self.drop_stale(session);
        let local = event
            .position()
            .map(|p| CoordinateMapper::to_image_local(p, container));
        log::trace!("{event:?} in {} (local {local:?})", session.mode().name());

        let outcome = match (event, local) {
            (InputEvent::EnterPlacingText, _) => self.enter_placing_text(session),
            (InputEvent::PointerDown { target, .. }, Some(local)) => {
                let hit = self.resolve_target(session, local, *target);
                self.pointer_down(session, local, hit)
            }
            (InputEvent::PointerMove { .. }, Some(local)) => self.pointer_move(session, local),
            (InputEvent::PointerUp { .. }, Some(local)) => self.pointer_up(session, local),
            (InputEvent::DoubleClick { target, .. }, Some(local)) => {
                let hit = self.resolve_target(session, local, *target);
                self.double_click(session, hit)
            }
            (InputEvent::Key { key, modifiers }, _) => self.key(session, key, *modifiers),
            (InputEvent::TextInput { value }, _) => self.text_input(session, value),
            (InputEvent::Blur, _) => self.commit_editing(session),
            _ => EventOutcome::unchanged(),
        };

        if recovered {
            EventOutcome::changed().merge(outcome)
        } else {
            outcome
        }
    }

    /// Return to idle if the mode refers to a label that no longer exists.
    fn drop_stale(&self, session: &mut SessionState) -> bool {
        let target = match session.mode() {
            Mode::Dragging { id, .. } | Mode::Editing { id } => id,
            Mode::Idle | Mode::PlacingText => return false,
        };
        if session.labels().contains(target) {
            return false;
        }
        log::debug!("label {target:?} vanished; back to idle");
        session.reset_mode();
        session.clear_selection();
        true
    }

    // ─── Placement ───────────────────────────────────────────────────────

    fn enter_placing_text(&self, session: &mut SessionState) -> EventOutcome {
        let mut outcome = self.commit_editing(session);
        if session.mode() == Mode::PlacingText {
            return outcome;
        }
        session.enter_placing_text();
        outcome.changed = true;
        outcome
    }

    fn place(&self, session: &mut SessionState, local: Point) -> EventOutcome {
        let id = session.place_label(local, &self.config.defaults);
        log::debug!("placed {id:?} at ({}, {})", local.x, local.y);
        let mut outcome = EventOutcome::changed();
        if let Some(label) = session.label(id) {
            outcome.mutations.push(LabelMutation::Add {
                label: Box::new(label.clone()),
            });
        }
        outcome
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    fn pointer_down(
        &self,
        session: &mut SessionState,
        local: Point,
        hit: Option<LabelId>,
    ) -> EventOutcome {
        match session.mode() {
            Mode::Editing { id } if hit == Some(id) => EventOutcome::unchanged(),
            Mode::Editing { .. } => {
                // Blur first, then treat the press as if editing never happened.
                let committed = self.commit_editing(session);
                committed.merge(self.pointer_down(session, local, hit))
            }
            Mode::Dragging { .. } => {
                // Missed the pointer-up (released outside the window).
                session.reset_mode();
                EventOutcome::changed().merge(self.pointer_down(session, local, hit))
            }
            Mode::PlacingText | Mode::Idle => match hit {
                Some(id) => self.grab(session, id, local),
                None if session.mode() == Mode::PlacingText => self.place(session, local),
                None => EventOutcome::unchanged(),
            },
        }
    }

    fn grab(&self, session: &mut SessionState, id: LabelId, local: Point) -> EventOutcome {
        let Some(origin) = session.label(id).map(|l| l.position) else {
            return EventOutcome::unchanged();
        };
        if !session.begin_drag(id, local - origin, local) {
            return EventOutcome::unchanged();
        }
        log::debug!("grabbed {id:?}");
        EventOutcome::changed()
    }

    fn pointer_move(&self, session: &mut SessionState, local: Point) -> EventOutcome {
        let Mode::Dragging {
            id,
            grab,
            press,
            moved,
        } = session.mode()
        else {
            return EventOutcome::unchanged();
        };
        if !moved && local.distance(press) < self.config.drag_threshold {
            return EventOutcome::unchanged();
        }
        session.mark_drag_moved();
        self.move_label(session, id, local - grab)
    }

    fn pointer_up(&self, session: &mut SessionState, local: Point) -> EventOutcome {
        let Mode::Dragging {
            id,
            grab,
            press,
            moved,
        } = session.mode()
        else {
            return EventOutcome::unchanged();
        };
        // Release may arrive with no moves in between.
        let moved = moved || local.distance(press) >= self.config.drag_threshold;
        let mut outcome = EventOutcome::changed();
        if moved
            && session
                .label(id)
                .is_some_and(|l| l.position != local - grab)
        {
            outcome = outcome.merge(self.move_label(session, id, local - grab));
        }
        session.reset_mode();
        log::debug!("released {id:?} (moved: {moved})");
        outcome
    }

    fn move_label(&self, session: &mut SessionState, id: LabelId, position: Point) -> EventOutcome {
        if !session.labels_mut().update_position(id, position) {
            session.reset_mode();
            session.clear_selection();
            return EventOutcome::changed();
        }
        EventOutcome {
            changed: true,
            mutations: vec![LabelMutation::MoveTo { id, position }],
            action: None,
        }
    }

    fn double_click(&self, session: &mut SessionState, hit: Option<LabelId>) -> EventOutcome {
        let mut outcome = EventOutcome::unchanged();
        match session.mode() {
            Mode::Editing { id } if hit == Some(id) => return outcome,
            Mode::Editing { .. } => outcome = self.commit_editing(session),
            Mode::Dragging { .. } => session.reset_mode(),
            Mode::Idle | Mode::PlacingText => {}
        }
        let Some(id) = hit else {
            return outcome;
        };
        if session.begin_editing(id) {
            log::debug!("editing {id:?}");
            outcome.changed = true;
        }
        outcome
    }

    // ─── Keyboard & text ─────────────────────────────────────────────────

    fn key(&self, session: &mut SessionState, key: &str, modifiers: Modifiers) -> EventOutcome {
        if session.editing().is_some() {
            let Some(action) = ShortcutMap::resolve_editing(key, modifiers) else {
                return EventOutcome::unchanged();
            };
            // Enter and Escape both keep what was typed.
            let mut outcome = self.commit_editing(session);
            outcome.action = Some(action);
            return outcome;
        }

        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return EventOutcome::unchanged();
        };
        let mut outcome = match action {
            ShortcutAction::AddText => self.enter_placing_text(session),
            ShortcutAction::Cancel => self.cancel(session),
            ShortcutAction::Delete => self.delete_selected(session),
            ShortcutAction::Commit | ShortcutAction::Export => EventOutcome::unchanged(),
        };
        outcome.action = Some(action);
        outcome
    }

    fn cancel(&self, session: &mut SessionState) -> EventOutcome {
        match session.mode() {
            Mode::PlacingText => {
                session.reset_mode();
                EventOutcome::changed()
            }
            Mode::Idle if session.selected().is_some() => {
                session.clear_selection();
                EventOutcome::changed()
            }
            _ => EventOutcome::unchanged(),
        }
    }

    fn delete_selected(&self, session: &mut SessionState) -> EventOutcome {
        if session.mode() != Mode::Idle {
            return EventOutcome::unchanged();
        }
        let Some(id) = session.selected() else {
            return EventOutcome::unchanged();
        };
        if session.remove_label(id).is_none() {
            return EventOutcome::unchanged();
        }
        log::debug!("removed {id:?}");
        EventOutcome {
            changed: true,
            mutations: vec![LabelMutation::Remove { id }],
            action: None,
        }
    }

    fn text_input(&self, session: &mut SessionState, value: &str) -> EventOutcome {
        let Some(id) = session.editing() else {
            return EventOutcome::unchanged();
        };
        if session.label(id).is_some_and(|l| l.content == value) {
            return EventOutcome::unchanged();
        }
        session.labels_mut().update_content(id, value);
        EventOutcome {
            changed: true,
            mutations: vec![LabelMutation::SetContent {
                id,
                content: value.to_string(),
            }],
            action: None,
        }
    }

    /// Close the inline input. Content is already live in the store.
    fn commit_editing(&self, session: &mut SessionState) -> EventOutcome {
        match session.finish_editing() {
            Some(id) => {
                log::debug!("finished editing {id:?}");
                EventOutcome::changed()
            }
            None => EventOutcome::unchanged(),
        }
    }
}
