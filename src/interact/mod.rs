mod highlight;
mod tooltip;
mod transition;

use std::collections::HashSet;

pub use highlight::{Highlighter, HoverState, OpacityLevels};
pub use tooltip::{DebounceTimer, TooltipCoordinator, DEFAULT_HIDE_DELAY};
pub use transition::{Animator, Easing, DEFAULT_DURATION};

use crate::graph::{ElementKey, NodeId};
use crate::layout::SankeyGraph;

/// Tunables for one interaction session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub levels: OpacityLevels,
    pub easing: Easing,
    /// Opacity transition length, seconds.
    pub duration: f64,
    /// Tooltip dismissal debounce, seconds.
    pub hide_delay: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            levels: OpacityLevels::default(),
            easing: Easing::default(),
            duration: DEFAULT_DURATION,
            hide_delay: DEFAULT_HIDE_DELAY,
        }
    }
}

/// Interaction state for one positioned graph: hover highlighting, opacity
/// transitions and the tooltip, driven by pointer events and per-frame
/// `tick(now)` calls.
///
/// Pointer events mutate state synchronously; nothing here blocks or reads a
/// clock. When the positioned graph is recomputed, [`Session::rebind`] carries
/// the surviving elements over.
pub struct Session {
    highlight: Highlighter,
    animator: Animator,
    tooltip: TooltipCoordinator,
    levels: OpacityLevels,
    pointer: (f64, f64),
}

impl Session {
    pub fn new<N, L>(graph: &SankeyGraph<N, L>) -> Self {
        Self::with_config(graph, SessionConfig::default())
    }

    pub fn with_config<N, L>(graph: &SankeyGraph<N, L>, config: SessionConfig) -> Self {
        let mut animator = Animator::new(config.duration, config.easing);
        seed_elements(&mut animator, graph, config.levels.base);
        Self {
            highlight: Highlighter::bind(graph),
            animator,
            tooltip: TooltipCoordinator::new(config.hide_delay),
            levels: config.levels,
            pointer: (0.0, 0.0),
        }
    }

    /// Points the session at a freshly computed graph. Hover and tooltip
    /// reset; elements present in both graphs keep their current opacity and
    /// head back to base, removed ones are dropped, new ones seed at base.
    pub fn rebind<N, L>(&mut self, graph: &SankeyGraph<N, L>) {
        self.highlight.rebind(graph);
        self.tooltip.hide();

        let highlight = &self.highlight;
        self.animator.retain(|key| highlight.contains(key));
        seed_elements(&mut self.animator, graph, self.levels.base);
        let base = self.levels.base;
        self.animator.retarget_each(|_| base);
    }

    /// Latest pointer position in the rendering surface's coordinates. Call
    /// before the hover event for the same frame so the tooltip lands where
    /// the pointer is.
    pub fn move_pointer(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    pub fn hover_node(&mut self, id: &NodeId) {
        if self.highlight.hover_node(id) {
            self.retarget_opacities();
        }
        self.sync_tooltip();
    }

    pub fn hover_link(&mut self, source: &NodeId, target: &NodeId) {
        if self.highlight.hover_link(source, target) {
            self.retarget_opacities();
        }
        self.sync_tooltip();
    }

    /// Pointer is over nothing. Highlight drops immediately; the tooltip
    /// lingers until the debounce delay runs out.
    pub fn clear_hover(&mut self) {
        if self.highlight.clear() {
            self.retarget_opacities();
        }
        self.tooltip.schedule_hide();
    }

    /// Advances animations and the tooltip timer to `now` (seconds). Returns
    /// true while another frame is needed.
    pub fn tick(&mut self, now: f64) -> bool {
        let animating = self.animator.tick(now);
        let hide_pending = self.tooltip.tick(now);
        animating || hide_pending
    }

    /// Per-frame read model: the element's animated opacity. Keys the session
    /// does not know get the base level.
    pub fn opacity(&self, key: &ElementKey) -> f64 {
        self.animator.current(key).unwrap_or(self.levels.base)
    }

    pub fn hover(&self) -> &HoverState {
        self.highlight.state()
    }

    pub fn highlight_set(&self) -> &HashSet<ElementKey> {
        self.highlight.highlight_set()
    }

    pub fn tooltip_visible(&self) -> bool {
        self.tooltip.visible()
    }

    pub fn tooltip_position(&self) -> (f64, f64) {
        self.tooltip.position()
    }

    pub fn tooltip_payload(&self) -> Option<&ElementKey> {
        self.tooltip.payload()
    }

    fn retarget_opacities(&mut self) {
        let highlight = &self.highlight;
        let levels = self.levels;
        self.animator
            .retarget_each(|key| highlight.target(key, &levels));
    }

    fn sync_tooltip(&mut self) {
        match self.highlight.state() {
            HoverState::Idle => self.tooltip.schedule_hide(),
            HoverState::Node(id) => {
                let key = ElementKey::Node(id.clone());
                self.tooltip.show(key, self.pointer);
            }
            HoverState::Link(source, target) => {
                let key = ElementKey::Link(source.clone(), target.clone());
                self.tooltip.show(key, self.pointer);
            }
        }
    }
}

fn seed_elements<N, L>(animator: &mut Animator, graph: &SankeyGraph<N, L>, base: f64) {
    for node in &graph.nodes {
        animator.seed(node.key(), base);
    }
    for link in &graph.links {
        animator.seed(graph.link_key(link), base);
    }
}
