//! Per-column drop positions

use rand::Rng;

/// Vertical position of every column's head, in glyph cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropState {
    positions: Vec<f64>,
}

impl DropState {
    /// Upper bound on columns, whatever the surface and cell size
    pub const MAX_COLUMNS: usize = 4096;

    /// Number of whole columns that fit in `width`
    pub fn column_count(width: f64, cell_size: f64) -> usize {
        if !(width > 0.0 && cell_size > 0.0) {
            return 0;
        }
        let columns = (width / cell_size).floor();
        if columns >= Self::MAX_COLUMNS as f64 {
            return Self::MAX_COLUMNS;
        }
        columns as usize
    }

    /// Fresh drops for a `width` x `height` surface, each column starting on
    /// its own random row within the visible area
    pub fn new<R: Rng>(width: f64, height: f64, cell_size: f64, rng: &mut R) -> Self {
        let columns = Self::column_count(width, cell_size);
        let rows = (height.max(0.0)) / cell_size;
        let positions = (0..columns)
            .map(|_| 1.0 + rng.random::<f64>() * rows)
            .collect();
        Self { positions }
    }

    pub fn columns(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [f64] {
        &mut self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_column_count_floors() {
        assert_eq!(DropState::column_count(800.0, 16.0), 50);
        assert_eq!(DropState::column_count(815.9, 16.0), 50);
        assert_eq!(DropState::column_count(15.0, 16.0), 0);
        assert_eq!(DropState::column_count(-10.0, 16.0), 0);
        assert_eq!(DropState::column_count(f64::NAN, 16.0), 0);
        assert_eq!(DropState::column_count(800.0, 1e-300), DropState::MAX_COLUMNS);
        assert_eq!(DropState::column_count(f64::INFINITY, 16.0), DropState::MAX_COLUMNS);
    }

    #[test]
    fn test_start_rows_are_per_column_and_on_screen() {
        let mut rng = Pcg32::seed_from_u64(7);
        let drops = DropState::new(640.0, 480.0, 16.0, &mut rng);
        assert_eq!(drops.columns(), 40);
        for &p in drops.positions() {
            assert!((1.0..1.0 + 30.0).contains(&p), "start row {} off screen", p);
        }
        let first = drops.positions()[0];
        assert!(drops.positions().iter().any(|&p| p != first));
    }
}
