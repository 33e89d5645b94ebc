use super::*;

fn fake_jpeg(payload: &[u8]) -> Vec<u8> {
    let mut v = SOI.to_vec();
    v.extend_from_slice(payload);
    v.extend_from_slice(&EOI);
    v
}

#[test]
fn splits_concatenated_frames() {
    let frames = [fake_jpeg(&[1, 2, 3]), fake_jpeg(&[4]), fake_jpeg(&[0xFF, 0x00, 5])];
    let stream = frames.concat();
    let parsed = parse_jpeg_frames(&stream);
    assert_eq!(parsed.len(), 3);
    for (got, want) in parsed.iter().zip(&frames) {
        assert_eq!(*got, want.as_slice());
        assert!(got.starts_with(&[0xFF, 0xD8]) && got.ends_with(&[0xFF, 0xD9]));
    }
}

#[test]
fn skips_bytes_between_frames() {
    let mut stream = vec![0x00, 0x11];
    stream.extend(fake_jpeg(&[7]));
    stream.extend([0xAB, 0xCD]);
    stream.extend(fake_jpeg(&[8]));
    let parsed = parse_jpeg_frames(&stream);
    assert_eq!(parsed, vec![&fake_jpeg(&[7])[..], &fake_jpeg(&[8])[..]]);
}

#[test]
fn drops_truncated_trailing_frame() {
    let mut stream = fake_jpeg(&[1]);
    stream.extend([0xFF, 0xD8, 9, 9, 9]);
    assert_eq!(parse_jpeg_frames(&stream).len(), 1);
    assert!(parse_jpeg_frames(&[]).is_empty());
    assert!(parse_jpeg_frames(&[0xFF]).is_empty());
}

#[test]
fn complete_jpeg_check() {
    assert!(is_complete_jpeg(&fake_jpeg(&[])));
    assert!(!is_complete_jpeg(&[0xFF, 0xD8, 0xD9]));
    assert!(!is_complete_jpeg(&[0x00, 0xD8, 0xFF, 0xD9]));
}
