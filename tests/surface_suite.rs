use ambient_field::surface::{hsl_to_rgb, ColorStop, Hsla, PixelCanvas, RadialGradient, Surface};

const BG: [u8; 3] = [4, 6, 14];

fn canvas(w: usize, h: usize, lw: f32, lh: f32) -> PixelCanvas {
    let mut c = PixelCanvas::new(w, h, lw, lh);
    c.set_background(BG);
    c.clear();
    c
}

fn rgb(c: &PixelCanvas, x: usize, y: usize) -> [u8; 3] {
    let p = c.pixel(x, y).expect("in bounds");
    [p[0], p[1], p[2]]
}

fn touched(c: &PixelCanvas) -> usize {
    let (w, h) = c.raster_size();
    (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| rgb(c, x, y) != BG)
        .count()
}

// ── Color ───────────────────────────────────────────────────────────────────

#[test]
fn hsl_primaries() {
    assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
    assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), [0, 255, 0]);
    assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), [0, 0, 255]);
    assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), [255, 0, 0]);
    assert_eq!(hsl_to_rgb(-120.0, 1.0, 0.5), [0, 0, 255]);
}

#[test]
fn hsl_extremes() {
    assert_eq!(hsl_to_rgb(200.0, 1.0, 1.0), [255, 255, 255]);
    assert_eq!(hsl_to_rgb(200.0, 1.0, 0.0), [0, 0, 0]);
    assert_eq!(hsl_to_rgb(90.0, 0.0, 0.5), [128, 128, 128]);
}

#[test]
fn hsla_uses_percent_and_clamps_alpha() {
    assert_eq!(Hsla::new(0.0, 100.0, 50.0, 1.0).to_rgb(), [255, 0, 0]);
    assert_eq!(Hsla::new(0.0, 0.0, 0.0, 2.0).alpha(), 1.0);
    assert_eq!(Hsla::new(0.0, 0.0, 0.0, -1.0).alpha(), 0.0);
    assert_eq!(Hsla::new(0.0, 0.0, 0.0, f32::NAN).alpha(), 0.0);
}

#[test]
fn gradient_interpolates_between_stops() {
    let g = RadialGradient {
        cx: 0.0,
        cy: 0.0,
        radius: 10.0,
        stops: vec![
            ColorStop {
                offset: 0.0,
                color: Hsla::new(100.0, 50.0, 40.0, 0.8),
            },
            ColorStop {
                offset: 1.0,
                color: Hsla::new(100.0, 50.0, 20.0, 0.0),
            },
        ],
    };
    assert_eq!(g.color_at(0.0).a, 0.8);
    assert_eq!(g.color_at(1.0).a, 0.0);
    let mid = g.color_at(0.5);
    assert!((mid.a - 0.4).abs() < 1e-6);
    // Fading to transparent keeps the opaque stop's color.
    assert_eq!(mid.rgb, hsl_to_rgb(100.0, 0.5, 0.4));

    let empty = RadialGradient {
        stops: Vec::new(),
        ..g
    };
    assert_eq!(empty.color_at(0.3).a, 0.0);
}

#[test]
fn gradient_blends_stops_in_rgb() {
    let g = RadialGradient {
        cx: 0.0,
        cy: 0.0,
        radius: 10.0,
        stops: vec![
            ColorStop {
                offset: 0.0,
                color: Hsla::new(0.0, 100.0, 50.0, 1.0),
            },
            ColorStop {
                offset: 1.0,
                color: Hsla::new(240.0, 100.0, 50.0, 1.0),
            },
        ],
    };
    // Red to blue passes through purple, not through the green hues between.
    let mid = g.color_at(0.5);
    assert_eq!(mid.rgb, [128, 0, 128]);
    assert_eq!(mid.a, 1.0);
    assert_eq!(g.color_at(0.0).rgb, [255, 0, 0]);
    assert_eq!(g.color_at(1.0).rgb, [0, 0, 255]);
}

// ── Canvas ──────────────────────────────────────────────────────────────────

#[test]
fn clear_paints_background_opaque() {
    let c = canvas(4, 3, 40.0, 30.0);
    assert_eq!(c.pixels().len(), 4 * 3 * 4);
    assert_eq!(c.pixel(3, 2), Some([4, 6, 14, 255]));
    assert_eq!(c.pixel(4, 0), None);
    assert_eq!(c.size(), (40.0, 30.0));
}

#[test]
fn resize_reallocates_and_clears() {
    let mut c = canvas(4, 3, 40.0, 30.0);
    c.fill_rect(0.0, 0.0, 40.0, 30.0, Hsla::new(0.0, 100.0, 50.0, 1.0));
    c.resize(8, 6, 80.0, 60.0);
    assert_eq!(c.raster_size(), (8, 6));
    assert_eq!(c.pixels().len(), 8 * 6 * 4);
    assert_eq!(touched(&c), 0);
}

#[test]
fn opaque_rect_covers_its_area_in_logical_units() {
    let mut c = canvas(10, 10, 100.0, 100.0);
    c.fill_rect(0.0, 0.0, 50.0, 100.0, Hsla::new(0.0, 100.0, 50.0, 1.0));
    assert_eq!(rgb(&c, 0, 0), [255, 0, 0]);
    assert_eq!(rgb(&c, 4, 9), [255, 0, 0]);
    assert_eq!(rgb(&c, 5, 0), BG);
}

#[test]
fn translucent_fill_blends_over_background() {
    let mut c = PixelCanvas::new(2, 2, 2.0, 2.0);
    c.clear();
    c.fill_rect(0.0, 0.0, 2.0, 2.0, Hsla::new(0.0, 100.0, 50.0, 0.5));
    assert_eq!(rgb(&c, 1, 1), [128, 0, 0]);
}

#[test]
fn transparent_shapes_change_nothing() {
    let mut c = canvas(10, 10, 100.0, 100.0);
    let clear = Hsla::new(0.0, 100.0, 50.0, 0.0);
    c.fill_rect(0.0, 0.0, 100.0, 100.0, clear);
    c.fill_circle(50.0, 50.0, 20.0, clear);
    c.stroke_line(0.0, 0.0, 100.0, 100.0, 5.0, clear);
    assert_eq!(touched(&c), 0);
}

#[test]
fn tiny_circle_still_lights_a_pixel() {
    // 10 logical px per raster pixel; center on raster pixel (2, 3).
    let mut c = canvas(10, 10, 100.0, 100.0);
    c.fill_circle(25.0, 35.0, 0.5, Hsla::new(0.0, 100.0, 50.0, 1.0));
    assert_eq!(rgb(&c, 2, 3), [255, 0, 0]);
    assert!(touched(&c) >= 1);
}

#[test]
fn large_circle_leaves_corners_alone() {
    let mut c = canvas(20, 20, 20.0, 20.0);
    c.fill_circle(10.0, 10.0, 6.0, Hsla::new(240.0, 100.0, 50.0, 1.0));
    assert_eq!(rgb(&c, 10, 10), [0, 0, 255]);
    assert_eq!(rgb(&c, 0, 0), BG);
    assert_eq!(rgb(&c, 19, 19), BG);
}

#[test]
fn hairline_stays_visible_on_coarse_raster() {
    let mut c = canvas(10, 10, 100.0, 100.0);
    c.stroke_line(5.0, 55.0, 95.0, 55.0, 0.1, Hsla::new(120.0, 100.0, 50.0, 1.0));
    for x in 1..9 {
        assert_ne!(rgb(&c, x, 5), BG, "column {x}");
    }
    assert_eq!(rgb(&c, 5, 0), BG);
}

#[test]
fn off_canvas_shapes_are_clipped() {
    let mut c = canvas(10, 10, 100.0, 100.0);
    let red = Hsla::new(0.0, 100.0, 50.0, 1.0);
    c.fill_circle(-500.0, -500.0, 20.0, red);
    c.fill_rect(200.0, 200.0, 50.0, 50.0, red);
    c.stroke_line(-50.0, -50.0, -10.0, -10.0, 1.0, red);
    assert_eq!(touched(&c), 0);
}

#[test]
fn radial_fill_is_bounded_by_radius() {
    let mut c = canvas(20, 20, 20.0, 20.0);
    let g = RadialGradient {
        cx: 10.0,
        cy: 10.0,
        radius: 5.0,
        stops: vec![
            ColorStop {
                offset: 0.0,
                color: Hsla::new(0.0, 100.0, 50.0, 1.0),
            },
            ColorStop {
                offset: 1.0,
                color: Hsla::new(0.0, 100.0, 50.0, 0.0),
            },
        ],
    };
    c.fill_radial(&g);
    let center = rgb(&c, 10, 10);
    assert!(center[0] > 200, "center {center:?}");
    assert_eq!(rgb(&c, 10, 2), BG);
    assert_eq!(rgb(&c, 0, 0), BG);
}

#[test]
fn zero_sized_canvas_accepts_draws() {
    let mut c = PixelCanvas::new(0, 0, 0.0, 0.0);
    let red = Hsla::new(0.0, 100.0, 50.0, 1.0);
    c.clear();
    c.fill_circle(1.0, 1.0, 1.0, red);
    c.fill_rect(0.0, 0.0, 1.0, 1.0, red);
    c.stroke_line(0.0, 0.0, 1.0, 1.0, 1.0, red);
    assert!(c.pixels().is_empty());
}
