use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::assets::cache::AssetCache;
use crate::assets::storage::AssetStorage;
use crate::config::SceneConfig;
use crate::foundation::error::SceneResult;
use crate::render::compositor::{Compositor, RunOutcome};
use crate::render::surface::RenderSurface;
use crate::render::text::FontBook;
use crate::script::directive::ScenePlan;

/// Shared stop flag for an in-flight render. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Renders scene text onto a fresh surface.
///
/// A runner is cheap to clone and `Sync`; concurrent renders share the
/// asset cache and fonts, each gets its own surface.
#[derive(Clone)]
pub struct SceneRunner {
    config: SceneConfig,
    cache: Arc<AssetCache>,
    storage: Arc<dyn AssetStorage>,
    fonts: Arc<FontBook>,
}

impl std::fmt::Debug for SceneRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRunner")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl SceneRunner {
    pub fn new(
        config: SceneConfig,
        cache: Arc<AssetCache>,
        storage: Arc<dyn AssetStorage>,
        fonts: Arc<FontBook>,
    ) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache,
            storage,
            fonts,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    /// Render `source` to completion.
    pub fn render(&self, source: &str) -> SceneResult<RenderSurface> {
        let mut surface = self.blank()?;
        let plan = ScenePlan::parse(source);
        let mut compositor = Compositor::new(&self.config, &self.cache, &*self.storage, &self.fonts);
        self.run(&mut compositor, &mut surface, &plan)?;
        Ok(surface)
    }

    /// Render `source`, giving up as soon as `token` is cancelled. `None`
    /// means the render was abandoned and the partial surface dropped.
    pub fn render_with_cancel(
        &self,
        source: &str,
        token: &CancelToken,
    ) -> SceneResult<Option<RenderSurface>> {
        if token.is_cancelled() {
            return Ok(None);
        }
        let mut surface = self.blank()?;
        let plan = ScenePlan::parse(source);
        let mut compositor = Compositor::new(&self.config, &self.cache, &*self.storage, &self.fonts)
            .with_cancel(token);
        match self.run(&mut compositor, &mut surface, &plan)? {
            RunOutcome::Completed => Ok(Some(surface)),
            RunOutcome::Cancelled => {
                tracing::debug!("render cancelled");
                Ok(None)
            }
        }
    }

    /// Cleared surface plus the marker; what a scene with no directives
    /// renders to.
    pub fn baseline(&self) -> SceneResult<RenderSurface> {
        let mut surface = self.blank()?;
        let mut compositor = Compositor::new(&self.config, &self.cache, &*self.storage, &self.fonts);
        if self.config.marker {
            compositor.draw_marker(&mut surface)?;
        }
        Ok(surface)
    }

    fn blank(&self) -> SceneResult<RenderSurface> {
        RenderSurface::new(self.config.scene_w, self.config.scene_h)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(w = surface.width, h = surface.height))]
    fn run(
        &self,
        compositor: &mut Compositor<'_>,
        surface: &mut RenderSurface,
        plan: &ScenePlan,
    ) -> SceneResult<RunOutcome> {
        if self.config.marker {
            compositor.draw_marker(surface)?;
        }
        if plan.is_empty() {
            tracing::debug!("scene has nothing to draw");
            return Ok(RunOutcome::Completed);
        }
        Ok(compositor.run(surface, plan))
    }
}
