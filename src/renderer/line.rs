//! Integer Bresenham line tracing

/// Walk the pixels of the line from `(x0, y0)` towards `(x1, y1)`.
///
/// Endpoints are clamped into `[0, width] x [0, height]` first. The walk
/// always runs along the major axis from the lower to the higher
/// coordinate and takes `|major delta|` steps, so the far endpoint itself is
/// not visited and a zero-length line visits nothing. Clamping to `width`
/// (not `width - 1`) means the caller may receive coordinates one past the
/// last pixel and must drop them.
pub fn trace_line<F>(x0: i32, y0: i32, x1: i32, y1: i32, width: i32, height: i32, mut plot: F)
where
    F: FnMut(i32, i32),
{
    let (mut x0, mut y0) = (x0.clamp(0, width), y0.clamp(0, height));
    let (mut x1, mut y1) = (x1.clamp(0, width), y1.clamp(0, height));

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let step = if y0 < y1 { 1 } else { -1 };
    let mut error = dx / 2;
    let mut y = y0;

    for x in x0..x1 {
        if steep {
            plot(y, x);
        } else {
            plot(x, y);
        }
        error -= dy;
        if error < 0 {
            y += step;
            error += dx;
        }
    }
}
