use std::io::Cursor;

use super::*;
use crate::timeline::model::{Region, Regions, TimelineSlot};

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn dims() -> Dimensions {
    Dimensions::new(8, 8).unwrap()
}

struct Flaky;

impl ImageFetcher for Flaky {
    fn fetch(&self, url: &str) -> AnimResult<Vec<u8>> {
        Err(AnimError::validation(format!("bad host for {url}")))
    }
}

#[test]
fn normalize_rel_path_cleans_and_rejects() {
    assert_eq!(normalize_rel_path("a/./b\\c.png").unwrap(), "a/b/c.png");
    assert_eq!(normalize_rel_path("masks//eye.png").unwrap(), "masks/eye.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../secret.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn dir_fetcher_resolves_schemes() {
    let f = DirFetcher::new("/srv/assets");
    assert_eq!(
        f.resolve("masks/eye.png").unwrap(),
        PathBuf::from("/srv/assets/masks/eye.png")
    );
    assert_eq!(
        f.resolve("file:///tmp/eye.png").unwrap(),
        PathBuf::from("/tmp/eye.png")
    );
    assert!(matches!(
        f.resolve("https://cdn.example.com/eye.png"),
        Err(AnimError::SourceFetchFailed { .. })
    ));
}

#[test]
fn dir_fetcher_reads_files() {
    let root = std::env::temp_dir().join(format!("lcdanim_dir_fetcher_{}", std::process::id()));
    std::fs::create_dir_all(root.join("masks")).unwrap();
    std::fs::write(root.join("masks/a.bin"), b"abc").unwrap();

    let f = DirFetcher::new(&root);
    assert_eq!(f.fetch("masks/a.bin").unwrap(), b"abc");
    let err = f.fetch("masks/missing.bin").unwrap_err();
    let AnimError::SourceFetchFailed { cause, .. } = err else {
        panic!("expected fetch failure");
    };
    assert!(cause.is_some());
}

#[test]
fn fetch_all_keeps_request_order() {
    let mut mem = MemoryFetcher::new();
    for i in 0..16u8 {
        mem.insert(format!("u{i}"), vec![i]);
    }
    let urls: Vec<String> = (0..16).rev().map(|i| format!("u{i}")).collect();
    let got = fetch_all(&urls, &mem, Some(4)).unwrap();
    for ((url, bytes), expected) in got.iter().zip(&urls) {
        assert_eq!(url, expected);
        assert_eq!(format!("u{}", bytes[0]), *url);
    }
}

#[test]
fn fetch_all_reports_failures_as_fetch_errors() {
    let mem = MemoryFetcher::new();
    let err = fetch_all(&["nope.png".to_string()], &mem, None).unwrap_err();
    assert!(matches!(err, AnimError::SourceFetchFailed { .. }));
    assert!(err.is_fatal());

    let err = fetch_all(&["x.png".to_string()], &Flaky, Some(1)).unwrap_err();
    let AnimError::SourceFetchFailed { message, cause } = err else {
        panic!("expected fetch failure");
    };
    assert!(message.contains("x.png"));
    assert!(cause.unwrap().contains("bad host"));
}

#[test]
fn fetch_masks_decodes_each_url_once() {
    let slot = |url: &str| {
        TimelineSlot::composite(
            Regions {
                mouth: Some(Region::with_image(url)),
                ..Regions::default()
            },
            Vec::new(),
        )
    };
    let timeline = Timeline {
        intro: vec![slot("a.png"), slot("a.png")],
        looped: vec![slot("b.png"), TimelineSlot::full(0)],
        ..Timeline::default()
    };
    let mut mem = MemoryFetcher::new();
    mem.insert("a.png", png(8, 8));
    mem.insert("b.png", png(4, 2));

    let masks = fetch_masks(&timeline, &mem, dims(), Some(2)).unwrap();
    assert_eq!(masks.len(), 2);
    assert_eq!(masks.get("b.png").unwrap().dimensions(), (8, 8));
}

#[test]
fn fetch_masks_fails_on_unreachable_or_undecodable_mask() {
    let timeline = Timeline {
        looped: vec![TimelineSlot::composite(
            Regions {
                left_eye: Some(Region::with_image("eye.png")),
                ..Regions::default()
            },
            Vec::new(),
        )],
        ..Timeline::default()
    };
    let mem = MemoryFetcher::new();
    assert!(fetch_masks(&timeline, &mem, dims(), None).is_err());

    let mut bad = MemoryFetcher::new();
    bad.insert("eye.png", b"garbage".to_vec());
    assert!(matches!(
        fetch_masks(&timeline, &bad, dims(), None),
        Err(AnimError::SourceFetchFailed { .. })
    ));
}
