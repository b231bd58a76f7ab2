use glam::DVec2;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::viewpoint::Viewpoint;
use crate::world::{CELL_WIDTH, WorldMap};

/// Integer cell width on the world-unit lattice the traversal walks.
const CELL: i64 = CELL_WIDTH as i64;

/// Step-distance stand-in for a ray component that never crosses its
/// gridlines; large enough that the other axis always wins the comparison.
const AXIS_PARALLEL: f64 = 1e30;

/// Distance reported when a ray exhausts its step budget without striking a
/// wall. Column height is derived from the reciprocal, so this renders as
/// nothing.
pub const NO_HIT_DISTANCE: f64 = 1e9;

const DEFAULT_MAX_STEPS: usize = 4096;

/// Which gridline family a ray crossed when it struck a wall. Shading-only:
/// vertical and horizontal faces draw at different brightness so adjoining
/// walls stay distinguishable. `Unknown` marks a corner strike where neither
/// family applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Unknown,
}

/// Outcome of casting one column's ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Euclidean world-unit distance from the viewpoint to the strike
    /// position. Not corrected to the camera plane, so the classic fisheye
    /// curvature appears toward the screen edges.
    pub distance: f64,
    /// Material code of the struck cell; 0 only for the no-hit fallback.
    pub material: u8,
    pub orientation: Orientation,
}

/// Casts one ray per screen column through a [`WorldMap`], marching each ray
/// from gridline to gridline until it strikes an occupied cell.
#[derive(Debug, Clone, Copy)]
pub struct RayCaster {
    screen_width: usize,
    max_steps: usize,
}

impl RayCaster {
    pub fn new(screen_width: usize) -> Self {
        Self {
            screen_width,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Bound the per-ray traversal. Rays that run out of steps report the
    /// no-hit fallback instead of marching forever; only maps without a solid
    /// border can reach the cap.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn screen_width(&self) -> usize {
        self.screen_width
    }

    /// Cast every column for one frame: `screen_width + 1` results for the
    /// sampled columns `0..=screen_width`. Columns are independent, so they
    /// fan out across the rayon pool; the corner-continuity rule below runs
    /// afterwards over the finalized sequence.
    pub fn cast_all(&self, viewpoint: &Viewpoint, map: &WorldMap) -> Vec<HitResult> {
        let mut hits: Vec<HitResult> = (0..self.screen_width + 1)
            .into_par_iter()
            .map(|column| self.cast_column(viewpoint, map, column))
            .collect();

        // A corner strike has no gridline family of its own; it takes the
        // orientation of the column to its left so shading stays continuous
        // across the ambiguity.
        for i in 1..hits.len() {
            if hits[i].orientation == Orientation::Unknown {
                hits[i].orientation = hits[i - 1].orientation;
            }
        }
        hits
    }

    /// March a single column's ray. The traversal position is an integer
    /// world-unit point that advances to the nearest upcoming gridline
    /// crossing each iteration, moving along the ray in both axes
    /// proportionally and rounding to the lattice.
    pub fn cast_column(&self, viewpoint: &Viewpoint, map: &WorldMap, column: usize) -> HitResult {
        let ray_dir = viewpoint.ray_direction(column, self.screen_width);

        let mut world_x = viewpoint.position.x as i64;
        let mut world_y = viewpoint.position.y as i64;

        let delta = step_distances(ray_dir);
        let mut side_x = initial_side_distance(world_x, ray_dir.x, delta.x);
        let mut side_y = initial_side_distance(world_y, ray_dir.y, delta.y);

        for _ in 0..self.max_steps {
            // the next crossing lies on the axis with less distance left
            let along_ray = if side_x.abs() <= side_y.abs() {
                side_x
            } else {
                side_y
            };

            world_x += axis_advance(along_ray, delta.x);
            world_y += axis_advance(along_ray, delta.y);

            side_x = next_side_distance(world_x, ray_dir.x, delta.x);
            side_y = next_side_distance(world_y, ray_dir.y, delta.y);

            if let Some((material, orientation)) = classify_hit(map, world_x, world_y) {
                let strike = DVec2::new(world_x as f64, world_y as f64);
                return HitResult {
                    distance: viewpoint.position.distance(strike),
                    material,
                    orientation,
                };
            }
        }

        HitResult {
            distance: NO_HIT_DISTANCE,
            material: 0,
            orientation: Orientation::Unknown,
        }
    }
}

/// Signed distance traveled along the ray to cross one full cell width on
/// each axis. Zero components get the large stand-in instead of dividing.
fn step_distances(ray_dir: DVec2) -> DVec2 {
    let length = ray_dir.length();
    let axis = |component: f64| {
        if component == 0.0 {
            AXIS_PARALLEL
        } else {
            (CELL_WIDTH / component.abs()) * length * component.signum()
        }
    };
    DVec2::new(axis(ray_dir.x), axis(ray_dir.y))
}

/// Ray distance from the start position to its first gridline crossing on one
/// axis, from the fraction of the cell already behind the truncated position.
/// A start exactly on a gridline with a negative direction yields zero here;
/// the first recompute maps that to a full cell.
fn initial_side_distance(world: i64, dir: f64, delta: f64) -> f64 {
    let offset = world.rem_euclid(CELL) as f64;
    if dir < 0.0 {
        (offset / CELL_WIDTH) * delta
    } else {
        ((CELL_WIDTH - offset) / CELL_WIDTH) * delta
    }
}

/// Ray distance from the current lattice position to the next gridline in the
/// direction of travel. On a gridline the next crossing is a full cell away.
fn next_side_distance(world: i64, dir: f64, delta: f64) -> f64 {
    let mut dist = world.rem_euclid(CELL) as f64;
    if dir < 0.0 && dist == 0.0 {
        dist = CELL_WIDTH;
    } else if dir >= 0.0 {
        dist = CELL_WIDTH - dist;
        if dist == 0.0 {
            dist = CELL_WIDTH;
        }
    }
    (dist / CELL_WIDTH) * delta
}

/// World-unit advance on one axis for a move of `along_ray` down the ray,
/// rounded to the nearest lattice position. The chosen axis lands exactly on
/// its gridline; the other axis moves proportionally and can round past a
/// line without landing on it.
fn axis_advance(along_ray: f64, delta: f64) -> i64 {
    let units = ((along_ray / delta).abs() * CELL_WIDTH).round() as i64;
    if delta > 0.0 { units } else { -units }
}

/// Material and gridline family for a strike at a lattice position, or `None`
/// if the position touches no wall. Out-of-map probes read as empty.
fn classify_hit(map: &WorldMap, world_x: i64, world_y: i64) -> Option<(u8, Orientation)> {
    let on_vertical = world_x.rem_euclid(CELL) == 0;
    let on_horizontal = world_y.rem_euclid(CELL) == 0;
    let col = world_x.div_euclid(CELL);
    let row = world_y.div_euclid(CELL);

    let probe = |x: i64, y: i64| map.get(x, y).unwrap_or(0);

    if on_vertical && on_horizontal {
        // corner strike: probe the four cells meeting at the point, ahead
        // quadrant first, then diagonal, then the remaining two
        [
            (col, row),
            (col - 1, row - 1),
            (col - 1, row),
            (col, row - 1),
        ]
        .into_iter()
        .map(|(x, y)| probe(x, y))
        .find(|&material| material != 0)
        .map(|material| (material, Orientation::Unknown))
    } else if on_vertical {
        let (ahead, behind) = (probe(col, row), probe(col - 1, row));
        let material = if ahead != 0 { ahead } else { behind };
        (material != 0).then_some((material, Orientation::Vertical))
    } else if on_horizontal {
        let (ahead, behind) = (probe(col, row), probe(col, row - 1));
        let material = if ahead != 0 { ahead } else { behind };
        (material != 0).then_some((material, Orientation::Horizontal))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// 5x5 ring of material 1 around a 3x3 open center, 160x160 world units.
    fn ring_map() -> WorldMap {
        WorldMap::from_reader("11111\n10001\n10001\n10001\n11111\n".as_bytes())
            .expect("map should parse")
    }

    fn center() -> DVec2 {
        DVec2::new(80.0, 80.0)
    }

    #[test]
    fn centered_cast_hits_the_ring() {
        let vp = Viewpoint::new(center(), DVec2::new(1.0, 0.0), DVec2::new(0.0, 0.5));
        let hits = RayCaster::new(4).cast_all(&vp, &ring_map());

        assert_eq!(hits.len(), 5);
        for hit in &hits {
            assert!(hit.distance.is_finite());
            assert!(hit.distance > 0.0);
            // center-to-border is 1.5 cells straight ahead; the oblique edge
            // rays land on the border a little farther out
            assert!(hit.distance <= 1.75 * CELL_WIDTH);
            assert_eq!(hit.material, 1);
        }

        // facing straight along +X, every strike is on a vertical gridline
        let straight = &hits[2];
        assert_relative_eq!(straight.distance, 1.5 * CELL_WIDTH);
        assert_eq!(straight.orientation, Orientation::Vertical);
    }

    #[test]
    fn axis_parallel_ray_terminates() {
        let vp = Viewpoint::new(center(), DVec2::new(0.0, -1.0), DVec2::new(0.5, 0.0));
        let caster = RayCaster::new(4);

        // the middle column's ray has a zero X component
        let hit = caster.cast_column(&vp, &ring_map(), 2);
        assert_relative_eq!(hit.distance, 1.5 * CELL_WIDTH);
        assert_eq!(hit.material, 1);
        assert_eq!(hit.orientation, Orientation::Horizontal);
    }

    #[test]
    fn cast_is_idempotent() {
        let vp = Viewpoint::new(center(), DVec2::new(-16.0, 3.0), DVec2::new(-3.0, -16.0));
        let caster = RayCaster::new(64);
        let map = ring_map();

        let first = caster.cast_all(&vp, &map);
        let second = caster.cast_all(&vp, &map);
        assert_eq!(first, second);
    }

    #[test]
    fn returns_screen_width_plus_one_results() {
        let vp = Viewpoint::new(center(), DVec2::new(1.0, 0.0), DVec2::new(0.0, 0.5));
        for width in [1, 4, 64, 640] {
            let hits = RayCaster::new(width).cast_all(&vp, &ring_map());
            assert_eq!(hits.len(), width + 1);
        }
    }

    #[test]
    fn corner_strike_inherits_left_orientation() {
        // facing the bottom-right corner of the open area; the middle column
        // runs diagonally into the cell corner at (128, 128)
        let vp = Viewpoint::new(center(), DVec2::new(16.0, 16.0), DVec2::new(4.0, -4.0));
        let caster = RayCaster::new(2);
        let map = ring_map();

        let corner = caster.cast_column(&vp, &map, 1);
        assert_eq!(corner.orientation, Orientation::Unknown);
        assert_eq!(corner.material, 1);
        assert_relative_eq!(corner.distance, (48.0f64 * 48.0 * 2.0).sqrt());

        let hits = caster.cast_all(&vp, &map);
        assert_eq!(hits[0].orientation, Orientation::Horizontal);
        assert_eq!(hits[1].orientation, Orientation::Horizontal);
        assert_eq!(hits[2].orientation, Orientation::Vertical);
    }

    #[test]
    fn unbordered_map_degrades_to_no_hit() {
        let open = WorldMap::from_reader("000\n000\n000\n".as_bytes()).unwrap();
        assert!(!open.has_solid_border());

        let vp = Viewpoint::new(
            DVec2::new(48.0, 48.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 0.5),
        );
        let hit = RayCaster::new(4).with_max_steps(64).cast_column(&vp, &open, 2);
        assert_eq!(hit.material, 0);
        assert_eq!(hit.orientation, Orientation::Unknown);
        assert_relative_eq!(hit.distance, NO_HIT_DISTANCE);
    }

    #[test]
    fn materials_come_from_the_struck_cells() {
        // east wall replaced with material 2, south with 3
        let map = WorldMap::from_reader("11111\n10002\n10002\n10002\n13332\n".as_bytes()).unwrap();

        let east = Viewpoint::new(center(), DVec2::new(1.0, 0.0), DVec2::new(0.0, 0.5));
        for hit in RayCaster::new(8).cast_all(&east, &map) {
            assert!(hit.material == 2 || hit.material == 1);
        }

        let south = Viewpoint::new(center(), DVec2::new(0.0, 1.0), DVec2::new(-0.5, 0.0));
        let straight_down = RayCaster::new(8).cast_column(&south, &map, 4);
        assert_eq!(straight_down.material, 3);
        assert_eq!(straight_down.orientation, Orientation::Horizontal);
    }
}
