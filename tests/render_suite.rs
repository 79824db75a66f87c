use ambient_field::render::{Frame, HalfBlockRenderer, Renderer};

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
    buf
}

fn make_frame<'a>(
    cols: u16,
    visual_rows: u16,
    status_rows: u16,
    pixels: &'a [u8],
    status: &'a str,
    sync: bool,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + status_rows,
        visual_rows,
        pixel_width: cols as usize,
        pixel_height: visual_rows as usize * 2,
        pixels_rgba: pixels,
        status,
        sync_updates: sync,
    }
}

fn render_to_string(r: &mut HalfBlockRenderer, frame: &Frame<'_>) -> String {
    let mut out = Vec::new();
    r.render(frame, &mut out).expect("render");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn raster_is_two_pixels_per_cell() {
    let r = HalfBlockRenderer::new();
    assert_eq!(r.raster_size(80, 24), (80, 48));
    assert_eq!(r.raster_size(0, 0), (0, 0));
    assert_eq!(r.name(), "halfblock");
}

#[test]
fn solid_frame_emits_one_block_per_cell() {
    let px = solid_pixels(8, 8, 10, 20, 30);
    let frame = make_frame(8, 4, 0, &px, "", false);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);

    assert_eq!(s.matches('\u{2580}').count(), 32);
    // Unchanged colors are not re-sent.
    assert_eq!(s.matches("\x1b[38;2;10;20;30m").count(), 1);
    assert_eq!(s.matches("\x1b[48;2;10;20;30m").count(), 1);
    assert!(s.starts_with("\x1b[H"));
    assert!(!s.contains("\x1b[?2026h"));
}

#[test]
fn top_pixel_is_foreground_bottom_is_background() {
    let mut px = solid_pixels(1, 2, 0, 0, 255);
    px[0] = 255;
    px[1] = 0;
    px[2] = 0;
    let frame = make_frame(1, 1, 0, &px, "", false);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("\x1b[38;2;255;0;0m"));
    assert!(s.contains("\x1b[48;2;0;0;255m"));
}

#[test]
fn sync_updates_wrap_the_frame() {
    let px = solid_pixels(4, 4, 1, 2, 3);
    let frame = make_frame(4, 2, 0, &px, "", true);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.starts_with("\x1b[?2026h"));
    assert!(s.ends_with("\x1b[?2026l"));
}

#[test]
fn colors_are_resent_every_frame() {
    let px = solid_pixels(4, 4, 9, 9, 9);
    let frame = make_frame(4, 2, 0, &px, "", false);
    let mut r = HalfBlockRenderer::new();
    let _ = render_to_string(&mut r, &frame);
    let second = render_to_string(&mut r, &frame);
    assert!(second.contains("\x1b[38;2;9;9;9m"));
}

#[test]
fn status_line_is_clipped_to_width() {
    let px = solid_pixels(4, 4, 0, 0, 0);
    let frame = make_frame(4, 2, 1, &px, "abcdefghij", false);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("\x1b[3;1H"));
    assert!(s.contains("abcd"));
    assert!(!s.contains("abcde"));
}

#[test]
fn status_is_skipped_without_status_rows() {
    let px = solid_pixels(4, 4, 0, 0, 0);
    let frame = make_frame(4, 2, 0, &px, "hello", false);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(!s.contains("hello"));
}

#[test]
fn empty_or_mismatched_frames_write_nothing() {
    let px = solid_pixels(4, 4, 0, 0, 0);
    let mut r = HalfBlockRenderer::new();

    let empty = make_frame(0, 0, 0, &[], "", true);
    assert!(render_to_string(&mut r, &empty).is_empty());

    let mut mismatched = make_frame(4, 2, 0, &px, "", true);
    mismatched.pixel_width = 3;
    assert!(render_to_string(&mut r, &mismatched).is_empty());

    let short = make_frame(4, 2, 0, &px[..8], "", true);
    assert!(render_to_string(&mut r, &short).is_empty());
}
