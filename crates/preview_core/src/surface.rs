//! Two mount targets, one for stories and one for docs pages, with at most one visible.

use std::collections::VecDeque;

use shared::domain::StoryId;
use tracing::debug;

use crate::docs::DocsView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Primary,
    Docs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveSurface {
    #[default]
    None,
    Primary,
    Docs,
}

impl ActiveSurface {
    pub fn is_visible(self, surface: Surface) -> bool {
        matches!(
            (self, surface),
            (Self::Primary, Surface::Primary) | (Self::Docs, Surface::Docs)
        )
    }
}

impl From<Surface> for ActiveSurface {
    fn from(value: Surface) -> Self {
        match value {
            Surface::Primary => Self::Primary,
            Surface::Docs => Self::Docs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountedView {
    Story { id: StoryId, content: String },
    Docs(DocsView),
}

/// Journal entries kept between drains; older entries are dropped first.
pub const MAX_JOURNALED_OPS: usize = 256;

/// Side effects applied to the surfaces, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Mounted(Surface),
    Unmounted(Surface),
    Shown(Surface),
    Hidden(Surface),
    ScrollReset,
}

#[derive(Debug, Default)]
pub struct ViewSurfaceManager {
    active: ActiveSurface,
    primary: Option<MountedView>,
    docs: Option<MountedView>,
    ops: VecDeque<SurfaceOp>,
}

impl ViewSurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ActiveSurface {
        self.active
    }

    pub fn mounted(&self, surface: Surface) -> Option<&MountedView> {
        match surface {
            Surface::Primary => self.primary.as_ref(),
            Surface::Docs => self.docs.as_ref(),
        }
    }

    pub fn mount(&mut self, surface: Surface, view: MountedView) {
        debug!(?surface, "mounting view");
        *self.slot(surface) = Some(view);
        self.record(SurfaceOp::Mounted(surface));
    }

    pub fn unmount(&mut self, surface: Surface) -> Option<MountedView> {
        debug!(?surface, "unmounting view");
        self.record(SurfaceOp::Unmounted(surface));
        self.slot(surface).take()
    }

    /// Makes `surface` the visible one, hiding the other.
    pub fn show(&mut self, surface: Surface) {
        self.active = surface.into();
        self.record(SurfaceOp::Shown(surface));
    }

    pub fn hide(&mut self, surface: Surface) {
        if self.active.is_visible(surface) {
            self.active = ActiveSurface::None;
            self.record(SurfaceOp::Hidden(surface));
        }
    }

    pub fn reset_scroll(&mut self) {
        self.record(SurfaceOp::ScrollReset);
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        self.ops.drain(..).collect()
    }

    fn record(&mut self, op: SurfaceOp) {
        if self.ops.len() == MAX_JOURNALED_OPS {
            self.ops.pop_front();
        }
        self.ops.push_back(op);
    }

    fn slot(&mut self, surface: Surface) -> &mut Option<MountedView> {
        match surface {
            Surface::Primary => &mut self.primary,
            Surface::Docs => &mut self.docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story_view(id: &str) -> MountedView {
        MountedView::Story {
            id: StoryId::new(id),
            content: format!("<{id}>"),
        }
    }

    #[test]
    fn showing_one_surface_hides_the_other() {
        let mut surfaces = ViewSurfaceManager::new();
        assert_eq!(surfaces.active(), ActiveSurface::None);

        surfaces.show(Surface::Primary);
        assert!(surfaces.active().is_visible(Surface::Primary));
        assert!(!surfaces.active().is_visible(Surface::Docs));

        surfaces.show(Surface::Docs);
        assert!(surfaces.active().is_visible(Surface::Docs));
        assert!(!surfaces.active().is_visible(Surface::Primary));
    }

    #[test]
    fn hide_only_affects_the_visible_surface() {
        let mut surfaces = ViewSurfaceManager::new();
        surfaces.show(Surface::Docs);
        surfaces.hide(Surface::Primary);
        assert_eq!(surfaces.active(), ActiveSurface::Docs);

        surfaces.hide(Surface::Docs);
        assert_eq!(surfaces.active(), ActiveSurface::None);
    }

    #[test]
    fn mount_and_unmount_are_journaled() {
        let mut surfaces = ViewSurfaceManager::new();
        surfaces.mount(Surface::Primary, story_view("a"));
        assert_eq!(surfaces.mounted(Surface::Primary), Some(&story_view("a")));

        let removed = surfaces.unmount(Surface::Primary);
        assert_eq!(removed, Some(story_view("a")));
        assert!(surfaces.mounted(Surface::Primary).is_none());
        surfaces.reset_scroll();

        assert_eq!(
            surfaces.take_ops(),
            vec![
                SurfaceOp::Mounted(Surface::Primary),
                SurfaceOp::Unmounted(Surface::Primary),
                SurfaceOp::ScrollReset,
            ]
        );
        assert!(surfaces.take_ops().is_empty());
    }

    #[test]
    fn undrained_journal_keeps_only_the_newest_ops() {
        let mut surfaces = ViewSurfaceManager::new();
        surfaces.show(Surface::Docs);
        for _ in 0..MAX_JOURNALED_OPS {
            surfaces.reset_scroll();
        }

        let ops = surfaces.take_ops();
        assert_eq!(ops.len(), MAX_JOURNALED_OPS);
        assert!(ops.iter().all(|op| *op == SurfaceOp::ScrollReset));
    }
}
