//! Level completion check

use super::grid::Grid;

/// Destructible cells still standing
pub fn remaining(grid: &Grid) -> usize {
    grid.remaining_destructible()
}

/// A figure is cleared once no destructible cell remains; indestructible
/// cells never block completion
pub fn is_cleared(grid: &Grid) -> bool {
    remaining(grid) == 0
}
