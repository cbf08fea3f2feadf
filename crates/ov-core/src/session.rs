//! Per-page editing session: labels, selection, and interaction mode.
//!
//! The mode is a tagged enum so impossible combinations (placing while
//! editing, dragging two labels) cannot be expressed. Transition methods
//! keep the invariants: the edited label is always the selected label, and
//! a selection never outlives its label.

use crate::geom::Surface;
use crate::id::LabelId;
use crate::model::{ImageSource, LabelDefaults, TextLabel};
use crate::store::TextLabelStore;
use kurbo::{Point, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// The next background click creates a label.
    PlacingText,
    /// Pointer is held on a label.
    Dragging {
        id: LabelId,
        /// Pointer offset from the label's top-left at press time.
        grab: Vec2,
        /// Image-local press position.
        press: Point,
        /// Set once the pointer travels past the drag threshold.
        moved: bool,
    },
    /// Inline text input is open on a label.
    Editing { id: LabelId },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PlacingText => "placing-text",
            Self::Dragging { .. } => "dragging",
            Self::Editing { .. } => "editing",
        }
    }
}

pub struct SessionState {
    image_source: ImageSource,
    labels: TextLabelStore,
    selected: Option<LabelId>,
    mode: Mode,
    surface: Surface,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Empty session over the placeholder image.
    pub fn new() -> Self {
        Self::with_store(TextLabelStore::new())
    }

    pub fn with_store(labels: TextLabelStore) -> Self {
        Self {
            image_source: ImageSource::Default,
            labels,
            selected: None,
            mode: Mode::Idle,
            surface: Surface::default(),
        }
    }

    /// Session seeded with one default label at (100, 100), the way the
    /// editor page opens.
    pub fn with_welcome_label() -> Self {
        let mut session = Self::new();
        session
            .labels
            .add(Point::new(100.0, 100.0), &LabelDefaults::default());
        session
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn labels(&self) -> &TextLabelStore {
        &self.labels
    }

    /// Direct store access for content/position edits. Removal should go
    /// through [`SessionState::remove_label`] so selection stays consistent.
    pub fn labels_mut(&mut self) -> &mut TextLabelStore {
        &mut self.labels
    }

    pub fn label(&self, id: LabelId) -> Option<&TextLabel> {
        self.labels.find(id)
    }

    /// Selected label id. A reference to a label that no longer exists is
    /// never reported.
    pub fn selected(&self) -> Option<LabelId> {
        self.selected.filter(|id| self.labels.contains(*id))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn editing(&self) -> Option<LabelId> {
        match self.mode {
            Mode::Editing { id } => Some(id),
            _ => None,
        }
    }

    pub fn image_source(&self) -> &ImageSource {
        &self.image_source
    }

    pub fn set_image_source(&mut self, source: ImageSource) {
        log::debug!("background image → {source:?}");
        self.image_source = source;
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select an existing label. Returns `false` for unknown ids.
    pub fn select(&mut self, id: LabelId) -> bool {
        if !self.labels.contains(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ─── Mode transitions ────────────────────────────────────────────────

    pub fn enter_placing_text(&mut self) {
        self.mode = Mode::PlacingText;
    }

    /// Drop back to idle without touching selection.
    pub fn reset_mode(&mut self) {
        self.mode = Mode::Idle;
    }

    /// Create a label at `position`, select it, and leave placing mode.
    pub fn place_label(&mut self, position: Point, defaults: &LabelDefaults) -> LabelId {
        let id = self.labels.add(position, defaults);
        self.selected = Some(id);
        self.mode = Mode::Idle;
        id
    }

    /// Start holding `id`. Selects it; fails for unknown ids.
    pub fn begin_drag(&mut self, id: LabelId, grab: Vec2, press: Point) -> bool {
        if !self.select(id) {
            return false;
        }
        self.mode = Mode::Dragging {
            id,
            grab,
            press,
            moved: false,
        };
        true
    }

    pub fn mark_drag_moved(&mut self) {
        if let Mode::Dragging { moved, .. } = &mut self.mode {
            *moved = true;
        }
    }

    /// Open inline editing on `id`. Selects it; fails for unknown ids.
    pub fn begin_editing(&mut self, id: LabelId) -> bool {
        if !self.select(id) {
            return false;
        }
        self.mode = Mode::Editing { id };
        true
    }

    /// Close inline editing: back to idle with no selection. Returns the
    /// label that was being edited.
    pub fn finish_editing(&mut self) -> Option<LabelId> {
        let id = self.editing()?;
        self.mode = Mode::Idle;
        self.selected = None;
        Some(id)
    }

    /// Remove a label, clearing any selection, drag, or edit that refers to it.
    pub fn remove_label(&mut self, id: LabelId) -> Option<TextLabel> {
        let label = self.labels.remove(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        if matches!(self.mode, Mode::Dragging { id: d, .. } | Mode::Editing { id: d } if d == id) {
            self.mode = Mode::Idle;
        }
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;

    fn session() -> (SessionState, LabelId) {
        let mut s = SessionState::with_store(TextLabelStore::with_generator(IdGenerator::seeded(3)));
        let id = s.labels_mut().add(Point::new(10.0, 10.0), &LabelDefaults::default());
        (s, id)
    }

    #[test]
    fn welcome_label_matches_page() {
        let s = SessionState::with_welcome_label();
        assert_eq!(s.labels().len(), 1);
        let label = &s.labels().as_slice()[0];
        assert_eq!(label.position, Point::new(100.0, 100.0));
        assert_eq!(label.content, "New Text");
        assert_eq!(s.mode(), Mode::Idle);
        assert_eq!(s.image_source(), &ImageSource::Default);
    }

    #[test]
    fn editing_implies_selected() {
        let (mut s, id) = session();
        assert!(s.begin_editing(id));
        assert_eq!(s.selected(), Some(id));
        assert_eq!(s.editing(), Some(id));

        assert_eq!(s.finish_editing(), Some(id));
        assert_eq!(s.mode(), Mode::Idle);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn unknown_ids_do_not_change_mode() {
        let (mut s, _) = session();
        let ghost = LabelId::intern("session_ghost");
        assert!(!s.begin_editing(ghost));
        assert!(!s.begin_drag(ghost, Vec2::ZERO, Point::ZERO));
        assert_eq!(s.mode(), Mode::Idle);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn remove_clears_selection_and_edit() {
        let (mut s, id) = session();
        s.begin_editing(id);
        assert!(s.remove_label(id).is_some());
        assert_eq!(s.selected(), None);
        assert_eq!(s.mode(), Mode::Idle);
    }

    #[test]
    fn dangling_selection_is_hidden() {
        let (mut s, id) = session();
        s.select(id);
        // Bypass remove_label to simulate a stale reference
        s.labels_mut().remove(id);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn place_label_selects_and_exits_mode() {
        let (mut s, _) = session();
        s.enter_placing_text();
        let id = s.place_label(Point::new(5.0, 6.0), &LabelDefaults::default());
        assert_eq!(s.mode(), Mode::Idle);
        assert_eq!(s.selected(), Some(id));
        assert_eq!(s.labels().len(), 2);
    }
}
