use super::geometry::{Contour, Point};
use crate::segmentation::Mask;

/// Neighbour offsets in clockwise order (image coordinates, y pointing down),
/// starting east
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const WEST: usize = 4;

fn is_on(mask: &Mask, x: i32, y: i32) -> bool {
    x >= 0
        && y >= 0
        && (x as u32) < mask.width()
        && (y as u32) < mask.height()
        && mask.get_pixel(x as u32, y as u32)[0] != 0
}

fn direction_index(dx: i32, dy: i32) -> usize {
    DIRECTIONS
        .iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(WEST)
}

/// Outer boundaries of every 8-connected foreground region, in raster order
/// of each region's first pixel
pub fn find_contours(mask: &Mask) -> Vec<Contour> {
    let (width, height) = mask.dimensions();
    let mut visited = vec![false; width as usize * height as usize];
    let mut contours = Vec::new();

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let index = y as usize * width as usize + x as usize;
            if visited[index] || !is_on(mask, x, y) {
                continue;
            }

            contours.push(trace_outer(mask, Point { x, y }));
            fill_region(mask, Point { x, y }, &mut visited);
        }
    }

    contours
}

/// Mark every pixel 8-connected to `seed` as visited
fn fill_region(mask: &Mask, seed: Point, visited: &mut [bool]) {
    let width = mask.width() as usize;
    let mut stack = vec![seed];
    visited[seed.y as usize * width + seed.x as usize] = true;

    while let Some(current) = stack.pop() {
        for (dx, dy) in DIRECTIONS {
            let (nx, ny) = (current.x + dx, current.y + dy);
            if !is_on(mask, nx, ny) {
                continue;
            }
            let index = ny as usize * width + nx as usize;
            if !visited[index] {
                visited[index] = true;
                stack.push(Point { x: nx, y: ny });
            }
        }
    }
}

/// Moore-neighbour tracing of the outer boundary of the region containing
/// `start`.
///
/// `start` must be the region's first pixel in raster order, so its west,
/// north-west, north and north-east neighbours are background. Every boundary
/// pixel is kept; the start pixel is not repeated at the end.
fn trace_outer(mask: &Mask, start: Point) -> Contour {
    let mut contour = vec![start];
    let mut current = start;
    let mut backtrack = WEST;
    let mut second: Option<Point> = None;

    let limit = 4 * (mask.width() as usize * mask.height() as usize) + 8;
    for _ in 0..limit {
        let found = (1..=8)
            .map(|k| (backtrack + k) % 8)
            .find(|&d| is_on(mask, current.x + DIRECTIONS[d].0, current.y + DIRECTIONS[d].1));

        let Some(direction) = found else {
            // Isolated pixel
            break;
        };

        let next = Point {
            x: current.x + DIRECTIONS[direction].0,
            y: current.y + DIRECTIONS[direction].1,
        };

        match second {
            None => second = Some(next),
            Some(s) if current == start && next == s => {
                contour.pop();
                break;
            }
            _ => {}
        }

        // The neighbour checked just before `next` is background and becomes
        // the backtrack pixel for the following step
        let previous = (direction + 7) % 8;
        let back = Point {
            x: current.x + DIRECTIONS[previous].0,
            y: current.y + DIRECTIONS[previous].1,
        };
        backtrack = direction_index(back.x - next.x, back.y - next.y);

        contour.push(next);
        current = next;
    }

    contour
}
