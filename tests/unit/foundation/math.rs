use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u16(100, 128), 50);
}

#[test]
fn mean_luma_is_unweighted() {
    assert_eq!(mean_luma([0, 0, 0]), 0);
    assert_eq!(mean_luma([255, 255, 255]), 255);
    assert_eq!(mean_luma([30, 0, 0]), 10);
    assert_eq!(mean_luma([10, 20, 30]), 20);
}

#[test]
fn clamp_u8_saturates() {
    assert_eq!(clamp_u8(-4.0), 0);
    assert_eq!(clamp_u8(300.0), 255);
    assert_eq!(clamp_u8(127.6), 128);
}
