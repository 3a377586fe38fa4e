use super::*;
use crate::assets::storage::MemoryStorage;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn filled(w: u32, h: u32, px: [u8; 4]) -> RenderSurface {
    let mut s = RenderSurface::new(w, h).unwrap();
    for d in s.data.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
    s
}

struct Fixture {
    config: SceneConfig,
    cache: AssetCache,
    storage: MemoryStorage,
    fonts: FontBook,
}

impl Fixture {
    fn new() -> Self {
        Self {
            config: SceneConfig {
                scene_w: 16,
                scene_h: 16,
                prefetch: false,
                ..SceneConfig::default()
            },
            cache: AssetCache::new(),
            storage: MemoryStorage::new().with_file("gfx/red.png", png(4, 4, [255, 0, 0, 255])),
            fonts: FontBook::empty(),
        }
    }

    fn compositor(&self) -> Compositor<'_> {
        Compositor::new(&self.config, &self.cache, &self.storage, &self.fonts)
    }
}

#[test]
fn dark_overlay_halves_white() {
    let fx = Fixture::new();
    let mut surface = filled(4, 4, [255, 255, 255, 255]);
    fx.compositor()
        .apply(&mut surface, &Directive::DarkOverlay { amount: 0.5 })
        .unwrap();
    assert_eq!(surface.pixel(1, 1), Some([127, 127, 127, 255]));
}

#[test]
fn blur_keeps_a_uniform_surface_uniform_up_to_the_edges() {
    let fx = Fixture::new();
    let mut surface = filled(12, 8, [40, 80, 120, 255]);
    fx.compositor()
        .apply(
            &mut surface,
            &Directive::Blur {
                pixels: 4,
                tones: Vec::new(),
            },
        )
        .unwrap();
    for (x, y) in [(0, 0), (11, 7), (6, 4)] {
        let px = surface.pixel(x, y).unwrap();
        assert!((i32::from(px[0]) - 40).abs() <= 1, "{px:?}");
        assert_eq!(px[3], 255);
    }
}

#[test]
fn blur_with_zero_radius_only_applies_tones() {
    let fx = Fixture::new();
    let mut surface = filled(2, 2, [200, 200, 200, 255]);
    fx.compositor()
        .apply(
            &mut surface,
            &Directive::Blur {
                pixels: 0,
                tones: vec![crate::script::directive::ToneAdjust::Brightness(0.5)],
            },
        )
        .unwrap();
    assert_eq!(surface.pixel(0, 0), Some([100, 100, 100, 255]));
}

#[test]
fn bloom_brightens_and_leaves_black_alone() {
    let fx = Fixture::new();
    let mut grey = filled(6, 6, [100, 100, 100, 255]);
    let mut black = filled(6, 6, [0, 0, 0, 255]);
    let bloom = Directive::Bloom {
        pixels: 2,
        alpha: 0.5,
    };
    let mut c = fx.compositor();
    c.apply(&mut grey, &bloom).unwrap();
    c.apply(&mut black, &bloom).unwrap();
    assert!(grey.pixel(3, 3).unwrap()[0] >= 148);
    assert_eq!(black.pixel(3, 3), Some([0, 0, 0, 255]));
}

#[test]
fn unit_zoom_is_a_no_op() {
    let fx = Fixture::new();
    let mut surface = filled(8, 8, [1, 2, 3, 255]);
    surface.data[0..4].copy_from_slice(&[255, 0, 0, 255]);
    let before = surface.clone();
    let zoom = Directive::Zoom(ZoomParams {
        zoom: 1.0,
        ..ZoomParams::default()
    });
    fx.compositor().apply(&mut surface, &zoom).unwrap();
    assert_eq!(surface, before);
}

#[test]
fn zoom_magnifies_the_center() {
    let fx = Fixture::new();
    let mut surface = filled(8, 8, [0, 0, 255, 255]);
    for y in 3..5 {
        for x in 3..5 {
            let i = ((y * 8 + x) * 4) as usize;
            surface.data[i..i + 4].copy_from_slice(&[255, 0, 0, 255]);
        }
    }
    fx.compositor()
        .apply(&mut surface, &Directive::Zoom(ZoomParams::default()))
        .unwrap();
    assert!(surface.pixel(3, 3).unwrap()[0] >= 250);
    assert!(surface.pixel(0, 0).unwrap()[2] >= 250);
}

#[test]
fn invert_flips_white_to_black() {
    let fx = Fixture::new();
    let mut surface = filled(2, 2, [255, 255, 255, 255]);
    fx.compositor()
        .apply(&mut surface, &Directive::Invert)
        .unwrap();
    assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn image_lands_bottom_center_by_default() {
    let fx = Fixture::new();
    let plan = ScenePlan::parse("red");
    let mut surface = RenderSurface::new(16, 16).unwrap();
    let outcome = fx.compositor().run(&mut surface, &plan);
    assert_eq!(outcome, RunOutcome::Completed);
    let px = surface.pixel(7, 13).unwrap();
    assert!(px[0] >= 250 && px[1] <= 5 && px[3] >= 250, "{px:?}");
    assert_eq!(surface.pixel(7, 2), Some([0, 0, 0, 0]));
    assert_eq!(surface.pixel(1, 14), Some([0, 0, 0, 0]));
}

#[test]
fn missing_image_is_skipped() {
    let fx = Fixture::new();
    let plan = ScenePlan::parse("nowhere <");
    let mut surface = RenderSurface::new(16, 16).unwrap();
    assert_eq!(fx.compositor().run(&mut surface, &plan), RunOutcome::Completed);
    assert!(surface.data.iter().all(|&b| b == 0));
}

#[test]
fn prefetch_warms_the_cache() {
    let mut fx = Fixture::new();
    fx.storage.insert("gfx/blue.png", png(2, 2, [0, 0, 255, 255]));
    let plan = ScenePlan::parse("red\nblue\nred FLIP");
    fx.compositor().prefetch(&plan);
    assert_eq!(fx.cache.image_count(), 2);
    assert_eq!(fx.storage.read_count(), 2);
}

#[test]
fn cancelled_token_stops_before_the_first_write() {
    let fx = Fixture::new();
    let token = CancelToken::new();
    token.cancel();
    let plan = ScenePlan::parse("DARK\nred");
    let mut surface = RenderSurface::new(16, 16).unwrap();
    let outcome = fx.compositor().with_cancel(&token).run(&mut surface, &plan);
    assert_eq!(outcome, RunOutcome::Cancelled);
    assert!(surface.data.iter().all(|&b| b == 0));
}

#[test]
fn marker_paints_the_center_cyan() {
    let fx = Fixture::new();
    let mut surface = RenderSurface::new(400, 300).unwrap();
    fx.compositor().draw_marker(&mut surface).unwrap();
    assert_eq!(surface.pixel(200, 150), Some([0, 255, 255, 255]));
    assert_eq!(surface.pixel(5, 5), Some([0, 0, 0, 0]));
}
