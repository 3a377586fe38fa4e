use super::*;
use crate::assets::cache::AssetCache;
use crate::assets::storage::MemoryStorage;
use crate::config::SceneConfig;
use crate::render::text::FontBook;
use crate::scene::registry::binding_for;
use std::sync::atomic::{AtomicUsize, Ordering};

fn runner() -> SceneRunner {
    SceneRunner::new(
        SceneConfig {
            scene_w: 40,
            scene_h: 30,
            ..SceneConfig::default()
        },
        Arc::new(AssetCache::new()),
        Arc::new(MemoryStorage::new()),
        Arc::new(FontBook::empty()),
    )
    .unwrap()
}

#[test]
fn display_height_rounds_down() {
    let d = display_scale(495.0, 1920, 1080);
    assert!((d.scale - 0.2578125).abs() < 1e-12);
    assert_eq!(d.height, 278);
    assert_eq!(d.width, 495.0);
}

#[test]
fn degenerate_container_collapses() {
    assert_eq!(display_scale(0.0, 1920, 1080).height, 0);
    assert_eq!(display_scale(f64::NAN, 1920, 1080).scale, 0.0);
}

#[test]
fn listeners_fire_until_released() {
    let viewport = Viewport::new(100.0);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let sub = viewport.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    viewport.set_width(200.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(viewport.width(), 200.0);

    drop(sub);
    assert_eq!(viewport.listener_count(), 0);
    viewport.set_width(300.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn subscription_outliving_the_viewport_drops_quietly() {
    let viewport = Viewport::new(100.0);
    let sub = viewport.subscribe(|_| {});
    drop(viewport);
    drop(sub);
}

#[test]
fn block_tracks_viewport_and_releases_on_drop() {
    let runner = runner();
    let viewport = Viewport::new(1000.0);
    let binding = binding_for("scene").unwrap();
    let block = SceneBlock::mount(&runner, binding, &viewport, "DARK").unwrap();

    assert!((block.display().width - 495.0).abs() < 1e-9);
    assert!(block.surface().is_some());
    assert_eq!(viewport.listener_count(), 1);

    viewport.set_width(400.0);
    let d = block.display();
    assert!((d.width - 198.0).abs() < 1e-9);
    assert_eq!(d.height, 148);

    let token = block.cancel_token().clone();
    drop(block);
    assert!(token.is_cancelled());
    assert_eq!(viewport.listener_count(), 0);
    viewport.set_width(800.0);
}

#[test]
fn cancelled_block_stops_rerendering() {
    let runner = runner();
    let viewport = Viewport::new(600.0);
    let block = SceneBlock::mount(&runner, binding_for("scene_full").unwrap(), &viewport, "").unwrap();
    assert!(block.rerender(&runner, "INVERT").unwrap());
    block.cancel_token().cancel();
    assert!(!block.rerender(&runner, "INVERT").unwrap());
}
