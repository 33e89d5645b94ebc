use super::*;
use crate::foundation::core::Dimensions;
use crate::mjpeg::parse::parse_jpeg_frames;

fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut v = vec![0xFF, 0xD8];
    v.resize(len - 2, 0x42);
    v.extend([0xFF, 0xD9]);
    v
}

#[test]
fn assembles_with_offsets() {
    let mut a = MjpegAssembler::new();
    a.push_frame(&fake_jpeg(10)).unwrap();
    a.push_frame(&fake_jpeg(6)).unwrap();
    assert_eq!(a.frame_count(), 2);

    let (bytes, index) = a.finish(Fps(12));
    assert_eq!(bytes.len(), 16);
    assert_eq!(index.fps, Fps(12));
    assert_eq!(
        index.frames,
        vec![
            MjpegFrameEntry { offset: 0, length: 10 },
            MjpegFrameEntry { offset: 10, length: 6 },
        ]
    );
    assert_eq!(parse_jpeg_frames(&bytes).len(), 2);
}

#[test]
fn rejects_incomplete_frames() {
    let mut a = MjpegAssembler::new();
    assert!(a.push_frame(&[0xFF, 0xD8, 1, 2]).is_err());
    assert!(a.push_frame(&[]).is_err());
    assert_eq!(a.frame_count(), 0);
}

#[test]
fn index_serialises_to_json() {
    let index = MjpegIndex {
        fps: Fps(30),
        frames: vec![MjpegFrameEntry { offset: 0, length: 99 }],
    };
    let json = index.to_json().unwrap();
    let back: MjpegIndex = serde_json::from_str(&json).unwrap();
    assert_eq!(back, index);
    assert!(json.contains("\"length\": 99"));
}

#[test]
fn encoded_jpeg_is_complete_and_decodable() {
    let dims = Dimensions::new(24, 28).unwrap();
    let frame = RasterFrame::filled(dims, [200, 40, 40]);
    let jpeg = encode_jpeg(&frame, 85).unwrap();
    assert!(is_complete_jpeg(&jpeg));

    let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (24, 28));
    let px = decoded.get_pixel(12, 14).0;
    assert!(px[0].abs_diff(200) < 12 && px[1].abs_diff(40) < 12, "{px:?}");
}
