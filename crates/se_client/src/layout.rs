use se_core::config::GlobeConfig;
use se_core::globe::{Globe, GlobeView, ViewMode};

/// The window's single content container. It holds the globe view and
/// shows whichever globe the view mode selects.
pub struct CustomLayout {
    globe_view: GlobeView,
}

impl CustomLayout {
    pub fn new(config: &GlobeConfig) -> Self {
        let mut globe_view = GlobeView::new(config);
        globe_view.start_auto_rotate();
        Self { globe_view }
    }

    pub fn switch_earth_view(&mut self) -> ViewMode {
        self.globe_view.switch_view()
    }

    /// The one globe currently attached to the layout.
    pub fn visible_globe(&self) -> &Globe {
        self.globe_view.active_globe()
    }

    pub fn globe_view(&self) -> &GlobeView {
        &self.globe_view
    }

    pub fn globe_view_mut(&mut self) -> &mut GlobeView {
        &mut self.globe_view
    }
}
