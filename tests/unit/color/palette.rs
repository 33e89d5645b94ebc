use super::*;
use crate::foundation::core::Dimensions;

fn two_colour_samples() -> PaletteSamples {
    let mut px = vec![[255, 0, 0]; 10];
    px.extend(vec![[0, 0, 255]; 10]);
    PaletteSamples::from_pixels(px, 20)
}

#[test]
fn frame_indices_are_evenly_spaced() {
    assert_eq!(sample_frame_indices(5, 30), vec![0, 1, 2, 3, 4]);
    assert_eq!(sample_frame_indices(100, 4), vec![0, 25, 50, 75]);
    assert!(sample_frame_indices(0, 4).is_empty());
}

#[test]
fn samples_skip_pixels_under_black_floor() {
    let s = PaletteSamples::from_pixels([[0, 0, 0], [19, 19, 19], [20, 20, 20], [255, 0, 0]], 20);
    assert_eq!(s.len(), 2);
}

#[test]
fn collect_applies_stride_and_floor() {
    let dims = Dimensions::new(4, 1).unwrap();
    let frame = RasterFrame::new(
        4,
        1,
        vec![0, 0, 0, 255, 255, 255, 200, 10, 10, 255, 255, 255],
    )
    .unwrap();
    assert_eq!(frame.dimensions(), dims);

    let mut cfg = PipelineConfig {
        palette_pixel_stride: 1,
        ..PipelineConfig::default()
    };
    assert_eq!(PaletteSamples::collect(std::slice::from_ref(&frame), &cfg).len(), 3);

    cfg.palette_pixel_stride = 2;
    // Pixels 0 and 2; pixel 0 is black.
    assert_eq!(PaletteSamples::collect(&[frame], &cfg).len(), 1);
}

#[test]
fn empty_samples_give_all_black_palette() {
    let p = Palette::build(&PaletteSamples::default(), 1.15);
    assert_eq!(p.content_len(), 0);
    assert!(p.rgb().iter().all(|c| *c == [0, 0, 0]));
    assert!(p.rgb565().iter().all(|&c| c == 0));
}

#[test]
fn index_zero_is_always_black() {
    let samples = PaletteSamples::from_pixels((0..=255u8).map(|v| [v, 255 - v, 128]), 0);
    let p = Palette::build(&samples, 1.15);
    assert_eq!(p.color(BLACK_INDEX), [0, 0, 0]);
    assert_eq!(p.rgb565()[0], 0);
    assert!(p.content_len() <= CONTENT_COLORS);
}

#[test]
fn two_colours_split_into_two_entries() {
    let p = Palette::build(&two_colour_samples(), 1.0);
    assert_eq!(p.content_len(), 2);
    let content = &p.rgb()[1..=2];
    assert!(content.contains(&[255, 0, 0]));
    assert!(content.contains(&[0, 0, 255]));
    assert_eq!(p.color(p.nearest([250, 5, 5])), [255, 0, 0]);
    assert_eq!(p.color(p.nearest([5, 5, 240])), [0, 0, 255]);
}

#[test]
fn nearest_prefers_lowest_index_on_ties() {
    let p = Palette::build(&two_colour_samples(), 1.0);
    // Black is duplicated by every filler entry.
    assert_eq!(p.nearest([0, 0, 0]), BLACK_INDEX);
    assert_eq!(p.nearest([3, 2, 1]), BLACK_INDEX);
}

#[test]
fn saturation_boost_applies_to_content_entries() {
    let samples = PaletteSamples::from_pixels(vec![[200, 120, 120]; 8], 0);
    let plain = Palette::build(&samples, 1.0);
    let boosted = Palette::build(&samples, 1.5);
    assert_eq!(plain.color(1), [200, 120, 120]);
    assert!(boosted.color(1)[1] < 120);
}

#[test]
fn median_cut_respects_colour_budget() {
    let pixels: Vec<[u8; 3]> = (0..=255u8).map(|v| [v, v, v]).collect();
    assert_eq!(median_cut(pixels.clone(), 16).len(), 16);
    assert_eq!(median_cut(pixels, 1000).len(), 256);
    assert!(median_cut(Vec::new(), 8).is_empty());
    assert_eq!(median_cut(vec![[7, 7, 7]; 50], 8), vec![[7, 7, 7]]);
}
