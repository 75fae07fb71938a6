use crate::error::GeometryError;

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Ordered boundary of a closed region; the last point connects to the first
pub type Contour = Vec<Point>;

/// One concavity between a contour and its convex hull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvexityDefect {
    pub start: Point,
    pub end: Point,
    pub far: Point,
    /// Distance from `far` to the hull edge `start`-`end`
    pub depth: f64,
}

/// Zeroth and first order image moments of a polygon
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Centroid truncated to whole pixels, `(0, 0)` for a zero-area region
    pub fn centroid(&self) -> Point {
        if self.m00 == 0.0 {
            return Point::default();
        }
        Point {
            x: (self.m10 / self.m00) as i32,
            y: (self.m01 / self.m00) as i32,
        }
    }
}

fn cross(o: Point, a: Point, b: Point) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

fn squared_distance(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy
}

/// Polygon moments via Green's theorem over the contour edges
pub fn moments(contour: &[Point]) -> Moments {
    let n = contour.len();
    if n < 3 {
        return Moments::default();
    }

    let mut m = Moments::default();
    for i in 0..n {
        let p = contour[i];
        let q = contour[(i + 1) % n];
        let (px, py, qx, qy) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
        let a = px * qy - qx * py;
        m.m00 += a;
        m.m10 += (px + qx) * a;
        m.m01 += (py + qy) * a;
    }
    m.m00 *= 0.5;
    m.m10 /= 6.0;
    m.m01 /= 6.0;
    m
}

/// Enclosed polygon area (shoelace formula), independent of orientation
pub fn contour_area(contour: &[Point]) -> f64 {
    moments(contour).m00.abs()
}

/// Convex hull as indices into `contour`, sorted ascending
///
/// Collinear points on hull edges are left out. Fewer than three distinct
/// points give every distinct point's index.
pub fn convex_hull(contour: &[Point]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..contour.len()).collect();
    order.sort_by_key(|&i| (contour[i].x, contour[i].y));
    order.dedup_by_key(|i| contour[*i]);

    if order.len() < 3 {
        return order;
    }

    // Andrew's monotone chain
    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);
    for &i in &order {
        while hull.len() >= 2
            && cross(contour[hull[hull.len() - 2]], contour[hull[hull.len() - 1]], contour[i]) <= 0
        {
            hull.pop();
        }
        hull.push(i);
    }
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(contour[hull[hull.len() - 2]], contour[hull[hull.len() - 1]], contour[i]) <= 0
        {
            hull.pop();
        }
        hull.push(i);
    }
    hull.pop();

    hull.sort_unstable();
    hull
}

/// Distance from `p` to the line through `a` and `b`
fn distance_to_line(p: Point, a: Point, b: Point) -> f64 {
    let length = squared_distance(a, b).sqrt();
    if length == 0.0 {
        return squared_distance(p, a).sqrt();
    }
    cross(a, b, p).abs() as f64 / length
}

/// Deepest contour point between each pair of consecutive hull points
///
/// `hull` holds indices into `contour`. Only concavities with positive depth
/// are reported. Contours with fewer than four points or hulls with fewer
/// than three points have no defects.
pub fn convexity_defects(
    contour: &[Point],
    hull: &[usize],
) -> Result<Vec<ConvexityDefect>, GeometryError> {
    let n = contour.len();
    if let Some(&index) = hull.iter().find(|&&i| i >= n) {
        return Err(GeometryError::HullIndexOutOfRange { index, len: n });
    }

    let mut indices = hull.to_vec();
    indices.sort_unstable();
    indices.dedup();
    if n < 4 || indices.len() < 3 {
        return Ok(Vec::new());
    }

    let mut defects = Vec::new();
    for (k, &s) in indices.iter().enumerate() {
        let e = indices[(k + 1) % indices.len()];
        let start = contour[s];
        let end = contour[e];

        let span = (e + n - s) % n;
        let mut deepest: Option<(Point, f64)> = None;
        for step in 1..span {
            let p = contour[(s + step) % n];
            let depth = distance_to_line(p, start, end);
            if deepest.map_or(true, |(_, d)| depth > d) {
                deepest = Some((p, depth));
            }
        }

        if let Some((far, depth)) = deepest {
            if depth > 0.0 {
                defects.push(ConvexityDefect {
                    start,
                    end,
                    far,
                    depth,
                });
            }
        }
    }

    Ok(defects)
}

/// Interior angle at the far point of a defect, in degrees
///
/// With a = |end - start|, b = |far - start|, c = |end - far| the law of
/// cosines gives acos((b² + c² - a²) / 2bc).
pub fn defect_angle(defect: &ConvexityDefect) -> Result<f64, GeometryError> {
    let a2 = squared_distance(defect.end, defect.start);
    let b2 = squared_distance(defect.far, defect.start);
    let c2 = squared_distance(defect.end, defect.far);

    if a2 == 0.0 || b2 == 0.0 || c2 == 0.0 {
        return Err(GeometryError::DegenerateTriangle {
            a: a2.sqrt(),
            b: b2.sqrt(),
            c: c2.sqrt(),
        });
    }

    let cosine = ((b2 + c2 - a2) / (2.0 * b2.sqrt() * c2.sqrt())).clamp(-1.0, 1.0);
    Ok(cosine.acos().to_degrees())
}
