use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::foundation::error::SceneResult;
use crate::render::surface::RenderSurface;
use crate::scene::registry::TagBinding;
use crate::scene::runner::{CancelToken, SceneRunner};

/// How a fixed-size scene surface is shown inside a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub scale: f64,
    pub width: f64,
    /// Displayed height, rounded down to whole pixels.
    pub height: u32,
}

pub fn display_scale(container_width: f64, scene_w: u32, scene_h: u32) -> DisplayScale {
    let scale = if scene_w == 0 || !container_width.is_finite() || container_width <= 0.0 {
        0.0
    } else {
        container_width / f64::from(scene_w)
    };
    DisplayScale {
        scale,
        width: f64::from(scene_w) * scale,
        height: (f64::from(scene_h) * scale).floor() as u32,
    }
}

type Listener = Arc<dyn Fn(f64) + Send + Sync>;

struct Hub {
    width: f64,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Host width that changes over time, with resize listeners.
#[derive(Clone)]
pub struct Viewport {
    hub: Arc<Mutex<Hub>>,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("width", &self.width())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Viewport {
    pub fn new(width: f64) -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub {
                width,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Hub> {
        self.hub.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn width(&self) -> f64 {
        self.lock().width
    }

    /// Update the width and notify listeners. Listeners run after the lock
    /// is released so they may subscribe or drop subscriptions.
    pub fn set_width(&self, width: f64) {
        let listeners: Vec<Listener> = {
            let mut hub = self.lock();
            hub.width = width;
            hub.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(width);
        }
    }

    /// Register `listener` until the returned subscription is dropped.
    pub fn subscribe(&self, listener: impl Fn(f64) + Send + Sync + 'static) -> ResizeSubscription {
        let mut hub = self.lock();
        let id = hub.next_id;
        hub.next_id += 1;
        hub.listeners.push((id, Arc::new(listener)));
        ResizeSubscription {
            hub: Arc::downgrade(&self.hub),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

/// Live resize registration. Dropping it unregisters the listener before
/// `drop` returns.
#[must_use = "dropping the subscription unregisters the listener"]
pub struct ResizeSubscription {
    hub: Weak<Mutex<Hub>>,
    id: u64,
}

impl std::fmt::Debug for ResizeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeSubscription").field("id", &self.id).finish()
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[derive(Debug)]
struct BlockState {
    surface: Option<RenderSurface>,
    display: DisplayScale,
}

/// A scene mounted in a host: its binding, last rendered surface and the
/// display geometry kept in step with the viewport.
///
/// Dropping the block cancels any render still using its token and
/// releases the resize subscription.
#[derive(Debug)]
pub struct SceneBlock {
    binding: &'static TagBinding,
    state: Arc<Mutex<BlockState>>,
    token: CancelToken,
    subscription: Option<ResizeSubscription>,
}

impl SceneBlock {
    pub fn mount(
        runner: &SceneRunner,
        binding: &'static TagBinding,
        viewport: &Viewport,
        source: &str,
    ) -> SceneResult<Self> {
        let (scene_w, scene_h) = (runner.config().scene_w, runner.config().scene_h);
        let token = CancelToken::new();
        let state = Arc::new(Mutex::new(BlockState {
            surface: None,
            display: display_scale(binding.container_width(viewport.width()), scene_w, scene_h),
        }));

        let weak = Arc::downgrade(&state);
        let listener_token = token.clone();
        let subscription = viewport.subscribe(move |host_width| {
            if listener_token.is_cancelled() {
                return;
            }
            let Some(state) = weak.upgrade() else {
                return;
            };
            let geometry = display_scale(binding.container_width(host_width), scene_w, scene_h);
            tracing::trace!(tag = binding.tag, scale = geometry.scale, "rescaled");
            state.lock().unwrap_or_else(PoisonError::into_inner).display = geometry;
        });

        let block = Self {
            binding,
            state,
            token,
            subscription: Some(subscription),
        };
        block.rerender(runner, source)?;
        Ok(block)
    }

    /// Render `source` again, replacing the shown surface. Returns `false`
    /// when the block has been cancelled and nothing was drawn.
    pub fn rerender(&self, runner: &SceneRunner, source: &str) -> SceneResult<bool> {
        let Some(surface) = runner.render_with_cancel(source, &self.token)? else {
            return Ok(false);
        };
        self.lock().surface = Some(surface);
        Ok(true)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BlockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn binding(&self) -> &'static TagBinding {
        self.binding
    }

    pub fn display(&self) -> DisplayScale {
        self.lock().display
    }

    pub fn surface(&self) -> Option<RenderSurface> {
        self.lock().surface.clone()
    }

    /// Token shared with in-flight renders of this block.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for SceneBlock {
    fn drop(&mut self) {
        self.token.cancel();
        drop(self.subscription.take());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/view.rs"]
mod tests;
