use crate::types::ArtifactPresence;

/// Narrowest the docked panel can be dragged.
pub const MIN_PANEL_WIDTH: u32 = 300;
/// Widest the docked panel can be dragged, as a share of the viewport.
pub const MAX_WIDTH_FRACTION: f64 = 0.7;
/// Viewports narrower than this present the panel as a modal sheet.
pub const MODAL_BREAKPOINT: u32 = 768;
/// Docked width before the user drags the handle.
pub const DEFAULT_PANEL_WIDTH: u32 = 500;

/// Which artifact the panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactTab {
    Table,
    Graph,
    Code,
}

/// How the panel is presented, derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    Docked,
    Modal,
}

/// The artifact panel: visibility, active tab, drag width, and the
/// docked/modal presentation derived from the viewport.
///
/// One state record updated through explicit transitions; transitions
/// that depend on which artifacts exist take an [`ArtifactPresence`]
/// snapshot rather than reaching into session state.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    is_open: bool,
    active_tab: ArtifactTab,
    width_px: u32,
    viewport_width: u32,
    tab_chosen_this_turn: bool,
}

impl PanelState {
    #[must_use]
    pub fn new(viewport_width: u32) -> Self {
        Self {
            is_open: false,
            active_tab: ArtifactTab::Table,
            width_px: DEFAULT_PANEL_WIDTH,
            viewport_width,
            tab_chosen_this_turn: false,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn active_tab(&self) -> ArtifactTab {
        self.active_tab
    }

    #[must_use]
    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    #[must_use]
    pub fn presentation_mode(&self) -> PresentationMode {
        if self.viewport_width < MODAL_BREAKPOINT {
            PresentationMode::Modal
        } else {
            PresentationMode::Docked
        }
    }

    /// Opens a closed panel or closes an open one. On opening, the table
    /// tab becomes active when a table exists and the user has not
    /// picked a tab since the artifacts last changed.
    pub fn toggle(&mut self, presence: ArtifactPresence) {
        self.is_open = !self.is_open;
        if self.is_open && presence.table && !self.tab_chosen_this_turn {
            self.active_tab = ArtifactTab::Table;
        }
    }

    /// Activates a tab. A tab whose artifact kind is absent is disabled:
    /// selecting it is a no-op, not an error.
    pub fn select_tab(&mut self, tab: ArtifactTab, presence: ArtifactPresence) {
        if !presence.has(tab) {
            return;
        }
        self.active_tab = tab;
        self.tab_chosen_this_turn = true;
    }

    /// Applies a drag delta to the docked panel width, clamped to
    /// `[MIN_PANEL_WIDTH, MAX_WIDTH_FRACTION × viewport]`. Only honored
    /// while open and docked.
    pub fn resize(&mut self, delta_px: i32) {
        if !self.is_open || self.presentation_mode() != PresentationMode::Docked {
            return;
        }
        let target = i64::from(self.width_px) + i64::from(delta_px);
        self.width_px = clamp_width(target, self.viewport_width);
    }

    /// Records a viewport width change. Crossing the breakpoint flips
    /// the presentation mode in place: the panel stays open and the
    /// active tab is preserved. The drag width is re-clamped so it never
    /// exceeds the new viewport's limit.
    pub fn viewport_changed(&mut self, viewport_width: u32) {
        self.viewport_width = viewport_width;
        self.width_px = clamp_width(i64::from(self.width_px), viewport_width);
    }

    /// Records that a completed turn replaced the artifact set. The
    /// default-tab rule re-arms, and the active tab moves off an
    /// artifact kind that no longer exists.
    pub fn artifacts_replaced(&mut self, presence: ArtifactPresence) {
        self.tab_chosen_this_turn = false;
        if !presence.has(self.active_tab) {
            self.active_tab = presence.first_available().unwrap_or(ArtifactTab::Table);
        }
    }
}

impl ArtifactPresence {
    /// Whether the artifact kind behind `tab` exists.
    #[must_use]
    pub fn has(self, tab: ArtifactTab) -> bool {
        match tab {
            ArtifactTab::Table => self.table,
            ArtifactTab::Graph => self.graph,
            ArtifactTab::Code => self.code,
        }
    }

    /// The first present artifact kind, in tab order.
    #[must_use]
    pub fn first_available(self) -> Option<ArtifactTab> {
        [ArtifactTab::Table, ArtifactTab::Graph, ArtifactTab::Code]
            .into_iter()
            .find(|tab| self.has(*tab))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_width(target: i64, viewport_width: u32) -> u32 {
    let max = (f64::from(viewport_width) * MAX_WIDTH_FRACTION) as i64;
    target.clamp(i64::from(MIN_PANEL_WIDTH), max.max(i64::from(MIN_PANEL_WIDTH))) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_present() -> ArtifactPresence {
        ArtifactPresence {
            table: true,
            graph: true,
            code: true,
        }
    }

    fn none_present() -> ArtifactPresence {
        ArtifactPresence::default()
    }

    #[test]
    fn opens_to_table_by_default() {
        let mut panel = PanelState::new(1280);
        panel.select_tab(ArtifactTab::Graph, all_present());

        panel.artifacts_replaced(all_present());
        panel.toggle(all_present());

        assert!(panel.is_open());
        assert_eq!(panel.active_tab(), ArtifactTab::Table);
    }

    #[test]
    fn explicit_tab_choice_survives_reopen() {
        let mut panel = PanelState::new(1280);
        panel.toggle(all_present());
        panel.select_tab(ArtifactTab::Graph, all_present());

        panel.toggle(all_present());
        panel.toggle(all_present());

        assert_eq!(panel.active_tab(), ArtifactTab::Graph);
    }

    #[test]
    fn selecting_active_tab_twice_changes_nothing() {
        let mut panel = PanelState::new(1280);
        panel.toggle(all_present());
        panel.select_tab(ArtifactTab::Code, all_present());
        let snapshot = panel.clone();

        panel.select_tab(ArtifactTab::Code, all_present());

        assert_eq!(panel, snapshot);
    }

    #[test]
    fn selecting_absent_tab_is_a_no_op() {
        let mut panel = PanelState::new(1280);
        panel.toggle(all_present());
        let snapshot = panel.clone();

        panel.select_tab(ArtifactTab::Graph, none_present());

        assert_eq!(panel, snapshot);
    }

    #[test]
    fn resize_clamps_to_bounds() {
        let mut panel = PanelState::new(1000);
        panel.toggle(all_present());

        panel.resize(-10_000);
        assert_eq!(panel.width_px(), MIN_PANEL_WIDTH);

        panel.resize(10_000);
        assert_eq!(panel.width_px(), 700);
    }

    #[test]
    fn resize_ignored_when_closed_or_modal() {
        let mut panel = PanelState::new(1280);
        panel.resize(100);
        assert_eq!(panel.width_px(), DEFAULT_PANEL_WIDTH);

        panel.toggle(all_present());
        panel.viewport_changed(600);
        panel.resize(100);
        assert_eq!(panel.presentation_mode(), PresentationMode::Modal);
        assert_eq!(panel.width_px(), 420);
    }

    #[test]
    fn breakpoint_crossing_preserves_tab_and_openness() {
        let mut panel = PanelState::new(1280);
        panel.toggle(all_present());
        panel.select_tab(ArtifactTab::Graph, all_present());
        assert_eq!(panel.presentation_mode(), PresentationMode::Docked);

        panel.viewport_changed(600);
        assert_eq!(panel.presentation_mode(), PresentationMode::Modal);
        assert!(panel.is_open());
        assert_eq!(panel.active_tab(), ArtifactTab::Graph);

        panel.viewport_changed(900);
        assert_eq!(panel.presentation_mode(), PresentationMode::Docked);
        assert!(panel.is_open());
        assert_eq!(panel.active_tab(), ArtifactTab::Graph);
    }

    #[test]
    fn viewport_shrink_reclamps_width() {
        let mut panel = PanelState::new(2000);
        panel.toggle(all_present());
        panel.resize(800);
        assert_eq!(panel.width_px(), 1300);

        panel.viewport_changed(1000);
        assert_eq!(panel.width_px(), 700);
    }

    #[test]
    fn active_tab_moves_off_absent_artifact() {
        let mut panel = PanelState::new(1280);
        panel.toggle(all_present());
        panel.select_tab(ArtifactTab::Graph, all_present());

        panel.artifacts_replaced(ArtifactPresence {
            table: false,
            graph: false,
            code: true,
        });

        assert_eq!(panel.active_tab(), ArtifactTab::Code);
    }
}
