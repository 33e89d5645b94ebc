use super::*;
use crate::timeline::model::{Artifact, Region, Regions};

fn dims() -> Dimensions {
    Dimensions::new(4, 4).unwrap()
}

/// 4x4 transparent mask with one pixel set.
fn dot(x: u32, y: u32, rgba: [u8; 4]) -> image::RgbaImage {
    let mut img = image::RgbaImage::new(4, 4);
    img.put_pixel(x, y, image::Rgba(rgba));
    img
}

fn mouth_slot(url: &str) -> TimelineSlot {
    TimelineSlot::composite(
        Regions {
            mouth: Some(Region::with_image(url)),
            ..Regions::default()
        },
        Vec::new(),
    )
}

fn masks() -> MaskSet {
    let mut m = MaskSet::new(dims());
    m.insert("mouth.png", &dot(1, 2, [255, 0, 0, 255]));
    m.insert("tear.png", &dot(3, 0, [0, 0, 255, 255]));
    m
}

#[test]
fn full_slots_resolve_in_range_or_fall_back() {
    let m = masks();
    assert_eq!(
        resolve_slot_or_fallback(&TimelineSlot::full(2), 3, &m),
        SlotResolution::Source(2)
    );
    assert_eq!(
        resolve_slot_or_fallback(&TimelineSlot::full(3), 3, &m),
        SlotResolution::Black(Fallback::SourceOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(
        resolve_slot_or_fallback(&TimelineSlot::full(-1), 3, &m),
        SlotResolution::Black(Fallback::SourceOutOfRange { index: -1, len: 3 })
    );
}

#[test]
fn composite_without_usable_masks_falls_back() {
    let m = masks();
    let empty = TimelineSlot::composite(Regions::default(), Vec::new());
    assert_eq!(
        resolve_slot_or_fallback(&empty, 1, &m),
        SlotResolution::Black(Fallback::NoUsableLayers)
    );
    assert_eq!(
        resolve_slot_or_fallback(&mouth_slot("missing.png"), 1, &m),
        SlotResolution::Black(Fallback::NoUsableLayers)
    );

    let no_url = TimelineSlot::composite(
        Regions::default(),
        vec![Artifact {
            name: "blank".into(),
            region: Region::default(),
        }],
    );
    assert_eq!(
        resolve_slot_or_fallback(&no_url, 1, &m),
        SlotResolution::Black(Fallback::NoUsableLayers)
    );
}

#[test]
fn blank_image_urls_count_as_no_mask() {
    let mut m = masks();
    m.insert("", &dot(0, 0, [255, 255, 255, 255]));
    for url in ["", "   "] {
        assert_eq!(
            resolve_slot_or_fallback(&mouth_slot(url), 1, &m),
            SlotResolution::Black(Fallback::NoUsableLayers),
            "url {url:?}"
        );
    }
}

#[test]
fn composite_skips_missing_masks_but_keeps_the_rest() {
    let m = masks();
    let slot = TimelineSlot::composite(
        Regions {
            left_eye: Some(Region::with_image("missing.png")),
            mouth: Some(Region::with_image("mouth.png")),
            ..Regions::default()
        },
        vec![Artifact {
            name: "tear".into(),
            region: Region::with_image("tear.png"),
        }],
    );
    let SlotResolution::Composite(layers) = resolve_slot_or_fallback(&slot, 0, &m) else {
        panic!("expected composite");
    };
    assert_eq!(layers, vec![m.get("mouth.png").unwrap(), m.get("tear.png").unwrap()]);
}

#[test]
fn only_mask_pixels_survive_over_black() {
    let m = masks();
    let out = composite_layers(&[m.get("mouth.png").unwrap()], dims(), 12).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            let expected = if (x, y) == (1, 2) { [255, 0, 0] } else { [0, 0, 0] };
            assert_eq!(out.pixel(x, y), expected, "({x}, {y})");
        }
    }
}

#[test]
fn partial_alpha_blends_over_black() {
    let layer = dot(0, 0, [255, 255, 255, 128]);
    let out = composite_layers(&[&layer], dims(), 12).unwrap();
    assert_eq!(out.pixel(0, 0), [128, 128, 128]);
}

#[test]
fn later_layers_cover_earlier_ones() {
    let under = dot(2, 2, [255, 0, 0, 255]);
    let over = dot(2, 2, [0, 255, 0, 255]);
    let out = composite_layers(&[&under, &over], dims(), 12).unwrap();
    assert_eq!(out.pixel(2, 2), [0, 255, 0]);
}

#[test]
fn near_black_pixels_snap_to_zero() {
    let mut layer = dot(0, 0, [10, 11, 5, 255]);
    layer.put_pixel(1, 0, image::Rgba([10, 11, 40, 255]));
    let out = composite_layers(&[&layer], dims(), 12).unwrap();
    assert_eq!(out.pixel(0, 0), [0, 0, 0]);
    assert_eq!(out.pixel(1, 0), [10, 11, 40]);

    let unsnapped = composite_layers(&[&layer], dims(), 0).unwrap();
    assert_eq!(unsnapped.pixel(0, 0), [10, 11, 5]);
}

#[test]
fn mismatched_layer_is_rejected() {
    let layer = image::RgbaImage::new(3, 4);
    assert!(composite_layers(&[&layer], dims(), 12).is_err());
}

#[test]
fn mask_set_fits_and_decodes() {
    let mut m = MaskSet::new(dims());
    m.insert("small.png", &image::RgbaImage::new(2, 2));
    assert_eq!(m.get("small.png").unwrap().dimensions(), (4, 4));

    let err = m.insert_encoded("junk.png", b"not an image").unwrap_err();
    assert!(matches!(err, AnimError::SourceFetchFailed { .. }));
    assert!(err.to_string().contains("junk.png"));
    assert_eq!(m.len(), 1);
}

#[derive(Default)]
struct Labels {
    black_calls: usize,
}

impl SlotRenderer for Labels {
    type Output = String;

    fn source(&mut self, index: usize) -> AnimResult<String> {
        Ok(format!("src{index}"))
    }

    fn composite(&mut self, frame: RasterFrame) -> AnimResult<String> {
        let lit = frame.pixels().filter(|px| *px != [0, 0, 0]).count();
        Ok(format!("comp{lit}"))
    }

    fn black(&mut self) -> AnimResult<String> {
        self.black_calls += 1;
        Ok("black".into())
    }
}

#[test]
fn render_all_keeps_timeline_order_and_actions() {
    let mut vibrate = TimelineSlot::full(0);
    vibrate.actions.push(HardwareAction {
        kind: "vibrate".into(),
        params: Default::default(),
    });
    let timeline = Timeline {
        intro: vec![vibrate],
        looped: vec![TimelineSlot::full(9), mouth_slot("mouth.png")],
        exit: vec![TimelineSlot::composite(Regions::default(), Vec::new())],
        ..Timeline::default()
    };
    let m = masks();

    let mut r = Labels::default();
    let frames = Compositor::new(&timeline, &m, 2, 12)
        .render_all(&mut r)
        .unwrap();

    let outputs: Vec<_> = frames.iter().map(|f| f.output.as_str()).collect();
    assert_eq!(outputs, ["src0", "black", "comp1", "black"]);
    assert_eq!(r.black_calls, 2);

    assert_eq!(frames[0].actions[0].kind, "vibrate");
    assert!(frames[1].actions.is_empty());
    assert_eq!(
        frames[1].origin,
        FrameOrigin::Fallback(Fallback::SourceOutOfRange { index: 9, len: 2 })
    );
    assert_eq!(frames[2].origin, FrameOrigin::Composite);
    assert_eq!((frames[3].phase, frames[3].local, frames[3].global), (Phase::Exit, 0, 3));
}
