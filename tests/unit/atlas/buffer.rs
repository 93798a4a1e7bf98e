use super::*;
use crate::foundation::core::{NEUTRAL_NORMAL_RGBA8, TRANSPARENT_RGBA8};

fn size(w: u32, h: u32) -> AtlasSize {
    AtlasSize {
        width: w,
        height: h,
    }
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(px))
}

#[test]
fn new_fills_every_pixel() {
    let buf = AtlasBuffer::new(size(3, 2), NEUTRAL_NORMAL_RGBA8);
    assert!(buf.image().pixels().all(|p| *p == NEUTRAL_NORMAL_RGBA8));
    assert_eq!(buf.size(), size(3, 2));
}

#[test]
fn clear_resets_after_writes() {
    let mut buf = AtlasBuffer::new(size(4, 4), TRANSPARENT_RGBA8);
    buf.blit(&solid(2, 2, [9, 9, 9, 255]), PixelPos::new(1, 1))
        .unwrap();
    buf.clear(TRANSPARENT_RGBA8);
    assert!(buf.image().pixels().all(|p| *p == TRANSPARENT_RGBA8));
}

#[test]
fn blit_overwrites_without_blending() {
    let mut buf = AtlasBuffer::new(size(4, 4), Rgba([200, 0, 0, 255]));
    buf.blit(&solid(2, 2, [0, 0, 50, 0]), PixelPos::new(2, 2))
        .unwrap();
    assert_eq!(buf.pixel(2, 2).unwrap(), Rgba([0, 0, 50, 0]));
    assert_eq!(buf.pixel(3, 3).unwrap(), Rgba([0, 0, 50, 0]));
    assert_eq!(buf.pixel(1, 1).unwrap(), Rgba([200, 0, 0, 255]));
}

#[test]
fn blit_anchors_cell_bottom_left_and_keeps_it_upright() {
    let mut cell = solid(2, 2, [0, 0, 0, 255]);
    cell.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
    let mut buf = AtlasBuffer::new(size(4, 4), TRANSPARENT_RGBA8);
    buf.blit(&cell, PixelPos::new(2, 0)).unwrap();

    // The cell's top-left pixel is one row above the anchor row.
    assert_eq!(buf.pixel(2, 1).unwrap(), Rgba([1, 2, 3, 4]));
    assert_eq!(buf.pixel(2, 0).unwrap(), Rgba([0, 0, 0, 255]));
    assert_eq!(buf.region(PixelPos::new(2, 0), 2, 2).unwrap(), cell);
    // Stored top row first: y = 0..2 is the lower half of the image.
    assert_eq!(*buf.image().get_pixel(2, 2), Rgba([1, 2, 3, 4]));
    assert_eq!(*buf.image().get_pixel(2, 0), TRANSPARENT_RGBA8);
}

#[test]
fn cell_in_top_row_lands_at_start_of_storage() {
    let mut buf = AtlasBuffer::new(size(4, 4), TRANSPARENT_RGBA8);
    buf.blit(&solid(2, 2, [7, 7, 7, 255]), PixelPos::new(0, 2))
        .unwrap();
    assert_eq!(*buf.image().get_pixel(0, 0), Rgba([7, 7, 7, 255]));
    assert_eq!(*buf.image().get_pixel(1, 1), Rgba([7, 7, 7, 255]));
    assert_eq!(*buf.image().get_pixel(0, 2), TRANSPARENT_RGBA8);
}

#[test]
fn out_of_bounds_blit_is_rejected_and_writes_nothing() {
    let mut buf = AtlasBuffer::new(size(4, 4), TRANSPARENT_RGBA8);
    let err = buf
        .blit(&solid(2, 2, [255, 255, 255, 255]), PixelPos::new(3, 0))
        .unwrap_err();
    assert!(matches!(err, SpritebakeError::OutOfBounds(_)));
    assert!(buf.image().pixels().all(|p| *p == TRANSPARENT_RGBA8));
}

#[test]
fn blit_at_huge_offset_does_not_overflow() {
    let mut buf = AtlasBuffer::new(size(4, 4), TRANSPARENT_RGBA8);
    assert!(
        buf.blit(&solid(1, 1, [1, 1, 1, 1]), PixelPos::new(u32::MAX, u32::MAX))
            .is_err()
    );
}

#[test]
fn pixel_lookup_is_checked() {
    let buf = AtlasBuffer::new(size(2, 2), TRANSPARENT_RGBA8);
    assert!(buf.pixel(2, 0).is_err());
    assert!(buf.pixel(0, 2).is_err());
    assert!(buf.region(PixelPos::new(1, 1), 2, 1).is_err());
}
