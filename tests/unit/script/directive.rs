use super::*;

fn directive(line: &str) -> Directive {
    Directive::from_line(&parse_line(line)).unwrap()
}

#[test]
fn overlays_default_to_half() {
    assert_eq!(directive("DARK"), Directive::DarkOverlay { amount: 0.5 });
    assert_eq!(
        directive("LIGHT amount:0.2"),
        Directive::LightOverlay { amount: 0.2 }
    );
}

#[test]
fn blur_collects_tone_keywords_in_order() {
    let d = directive("BLUR pixels:12 DARK SAT bogus");
    assert_eq!(
        d,
        Directive::Blur {
            pixels: 12,
            tones: vec![ToneAdjust::Brightness(0.5), ToneAdjust::Saturate(1.5)],
        }
    );
    assert_eq!(
        directive("BLUR"),
        Directive::Blur {
            pixels: 8,
            tones: vec![]
        }
    );
}

#[test]
fn unparsable_options_fall_back_to_defaults() {
    assert_eq!(
        directive("BLUR pixels:lots"),
        Directive::Blur {
            pixels: 8,
            tones: vec![]
        }
    );
    assert_eq!(directive("DARK amount:x"), Directive::DarkOverlay { amount: 0.5 });
    assert_eq!(directive("HUE amount:45deg"), Directive::HueRotate { degrees: 45.0 });
}

#[test]
fn blur_radius_is_clamped() {
    let Directive::Blur { pixels, .. } = directive("BLUR pixels:-4") else {
        panic!("expected blur");
    };
    assert_eq!(pixels, 0);
    let Directive::Blur { pixels, .. } = directive("BLUR pixels:99999") else {
        panic!("expected blur");
    };
    assert_eq!(pixels, MAX_BLUR_RADIUS);
}

#[test]
fn bloom_radius_is_never_zero() {
    assert_eq!(
        directive("BLOOM pixels:0"),
        Directive::Bloom {
            pixels: 1,
            alpha: 0.5
        }
    );
    assert_eq!(
        directive("BLOOM alpha:0.8"),
        Directive::Bloom {
            pixels: 8,
            alpha: 0.8
        }
    );
}

#[test]
fn filter_defaults() {
    assert_eq!(directive("GRAY"), Directive::Grayscale { amount: 100.0 });
    assert_eq!(directive("GRAYSCALE amount:40"), Directive::Grayscale { amount: 40.0 });
    assert_eq!(directive("SEPIA"), Directive::Sepia { amount: 100.0 });
    assert_eq!(directive("INVERT"), Directive::Invert);
    assert_eq!(directive("HUE"), Directive::HueRotate { degrees: 90.0 });
}

#[test]
fn commands_are_case_sensitive() {
    assert!(matches!(directive("dark"), Directive::ImagePlacement(_)));
}

#[test]
fn unknown_command_is_an_image() {
    let Directive::ImagePlacement(img) = directive("bg forest night") else {
        panic!("expected image");
    };
    assert_eq!(img.key, "bg/forest/night");
}

#[test]
fn zoom_window_clamps_focus_inside_scene() {
    let z = ZoomParams {
        zoom: 2.0,
        degrees: 0.0,
        focus: Vec2::new(0.0, 0.5),
    };
    let w = z.window(1920.0, 1080.0).unwrap();
    assert_eq!(w.center.x, 480.0);
    assert_eq!(w.center.y, 540.0);
    assert_eq!(w.size, Vec2::new(960.0, 540.0));
}

#[test]
fn zoom_one_is_identity() {
    let z = ZoomParams {
        zoom: 1.0,
        ..ZoomParams::default()
    };
    let w = z.window(1920.0, 1080.0).unwrap();
    assert_eq!(w.center, Point::new(960.0, 540.0));
    assert_eq!(w.size, Vec2::new(1920.0, 1080.0));
    let t = z.transform(1920.0, 1080.0).unwrap();
    for (a, b) in t.as_coeffs().iter().zip(Affine::IDENTITY.as_coeffs()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn zoom_rejects_non_positive_factor() {
    let z = ZoomParams {
        zoom: 0.0,
        ..ZoomParams::default()
    };
    assert!(z.window(100.0, 100.0).is_none());
}

#[test]
fn zoom_maps_window_center_to_scene_center() {
    let z = ZoomParams {
        zoom: 2.0,
        degrees: 30.0,
        focus: Vec2::new(0.25, 0.25),
    };
    let t = z.transform(200.0, 100.0).unwrap();
    let c = t * Point::new(50.0, 25.0);
    assert!((c.x - 100.0).abs() < 1e-9 && (c.y - 50.0).abs() < 1e-9);
}

#[test]
fn plan_defers_text_and_keeps_last() {
    let plan = ScenePlan::parse("TITLE \"one\"\nDARK & TITLE \"two\" <\nS \"sub\"\nbg");
    assert_eq!(plan.directives.len(), 2);
    assert_eq!(plan.directives[0], Directive::DarkOverlay { amount: 0.5 });
    assert_eq!(plan.title.as_ref().unwrap().text, "two");
    assert_eq!(plan.title.as_ref().unwrap().modifiers, vec!["<".to_string()]);
    assert_eq!(plan.subtitle.as_ref().unwrap().text, "sub");
}

#[test]
fn comment_only_source_is_empty() {
    assert!(ScenePlan::parse("%% nothing\n\n   \n%% here").is_empty());
    assert!(ScenePlan::parse("TITLE").is_empty());
}

#[test]
fn image_keys_are_deduplicated() {
    let plan = ScenePlan::parse("alice <\nbob\nalice FLIP\nalice happy");
    assert_eq!(plan.image_keys(), vec!["alice", "bob", "alice/happy"]);
}
