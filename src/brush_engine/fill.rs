use crate::brush_engine::stroke::OperationDelta;
use crate::canvas::buffer::PixelBuffer;
use crate::utils::color::ColorComponents;
use crate::utils::profiler::ScopeTimer;
use crate::utils::vector::PixelPoint;

/// Hard cap on pixels a single flood fill may repaint.
pub const MAX_FILL_PIXELS: usize = 2048;

/// 4-connected, stack-based flood fill starting at `start`.
///
/// Stops once [`MAX_FILL_PIXELS`] pixels were repainted; the rest of the region stays as it
/// was. Returns the number of pixels painted.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    delta: &mut OperationDelta,
    start: PixelPoint,
    color: ColorComponents,
) -> usize {
    if !buffer.contains(start) {
        return 0;
    }
    let target = buffer.get(start);
    if target == color {
        return 0;
    }

    let _timer = ScopeTimer::new("flood_fill");
    let mut stack = vec![start];
    let mut accepted = 0;
    while accepted < MAX_FILL_PIXELS {
        let Some(point) = stack.pop() else {
            break;
        };
        if delta.contains(point) || !buffer.contains(point) || buffer.get(point) != target {
            continue;
        }

        delta.paint(buffer, point, color);
        accepted += 1;

        stack.push(PixelPoint::new(point.x + 1, point.y));
        stack.push(PixelPoint::new(point.x - 1, point.y));
        stack.push(PixelPoint::new(point.x, point.y + 1));
        stack.push(PixelPoint::new(point.x, point.y - 1));
    }

    if accepted == MAX_FILL_PIXELS && !stack.is_empty() {
        log::debug!("flood fill stopped at {} pixels", MAX_FILL_PIXELS);
    }
    accepted
}

/// Fill the polygon through `vertices` using the non-zero winding rule.
///
/// Vertices and samples sit at pixel centers, and the path is closed back to the first
/// vertex. Pixels outside the buffer are skipped. Returns the number of pixels painted.
pub fn fill_polygon(
    buffer: &mut PixelBuffer,
    delta: &mut OperationDelta,
    vertices: &[PixelPoint],
    color: ColorComponents,
) -> usize {
    if vertices.len() < 3 {
        return 0;
    }
    let _timer = ScopeTimer::new("fill_polygon");
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);
    let min_y = vertices.iter().map(|v| v.y).min().unwrap_or(0).max(0);
    let max_y = vertices.iter().map(|v| v.y).max().unwrap_or(-1).min(h - 1);

    let mut painted = 0;
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    for y in min_y..=max_y {
        crossings.clear();
        let edges = vertices.iter().zip(vertices.iter().cycle().skip(1));
        for (a, b) in edges {
            if (a.y <= y) == (b.y <= y) {
                continue;
            }
            let (ax, ay) = (f64::from(a.x), f64::from(a.y));
            let t = (f64::from(y) - ay) / (f64::from(b.y) - ay);
            let x = ax + 0.5 + t * (f64::from(b.x) - ax);
            let direction = if b.y > a.y { 1 } else { -1 };
            crossings.push((x, direction));
        }
        crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding == 0 {
                continue;
            }
            let from = ((pair[0].0 - 0.5).ceil() as i32).max(0);
            let to = ((pair[1].0 - 0.5).ceil() as i32).min(w);
            for x in from..to {
                delta.paint(buffer, PixelPoint::new(x, y), color);
                painted += 1;
            }
        }
    }
    painted
}
