//! Coarse bucket grid over static obstacles
//!
//! Obstacles never move, so the partition is built once. Each obstacle is
//! stored in every bucket its bounding box overlaps; proximity queries only
//! visit the buckets overlapping the query circle.

use ahash::{AHashMap, AHashSet};

use crate::core::types::{Rect, Vec2};

pub struct ObstaclePartition {
    cell_size: f32,
    obstacles: Vec<Rect>,
    buckets: AHashMap<(i32, i32), Vec<usize>>,
}

impl ObstaclePartition {
    pub fn build(obstacles: &[Rect], cell_size: f32) -> Self {
        let mut partition = Self {
            cell_size,
            obstacles: obstacles.to_vec(),
            buckets: AHashMap::new(),
        };
        for (idx, rect) in obstacles.iter().enumerate() {
            let (min, max) = partition.bucket_span(rect.x, rect.y, rect.max_x(), rect.max_y());
            for by in min.1..=max.1 {
                for bx in min.0..=max.0 {
                    partition.buckets.entry((bx, by)).or_default().push(idx);
                }
            }
        }
        partition
    }

    #[inline]
    fn bucket_coord(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    fn bucket_span(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> ((i32, i32), (i32, i32)) {
        (self.bucket_coord(min_x, min_y), self.bucket_coord(max_x, max_y))
    }

    /// Obstacles whose buckets overlap the query circle (may include a few
    /// that do not actually touch it)
    pub fn candidates(&self, center: Vec2, radius: f32) -> Vec<&Rect> {
        let (min, max) = self.bucket_span(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        for by in min.1..=max.1 {
            for bx in min.0..=max.0 {
                let Some(bucket) = self.buckets.get(&(bx, by)) else {
                    continue;
                };
                for &idx in bucket {
                    if seen.insert(idx) {
                        out.push(&self.obstacles[idx]);
                    }
                }
            }
        }
        out
    }

    /// True if any obstacle touches the circle
    pub fn any_within(&self, center: Vec2, radius: f32) -> bool {
        self.candidates(center, radius)
            .into_iter()
            .any(|rect| rect.intersects_circle(center, radius))
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
