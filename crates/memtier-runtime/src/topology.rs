use core::fmt::Debug;

use crate::error::{InvalidLaunchConfig, LaunchError};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
/// The number of units along both axes of a group, totalling to the number of units sharing
/// one group-local memory region and one barrier.
pub struct GroupDim {
    /// The number of units in the x axis.
    pub x: u32,
    /// The number of units in the y axis.
    pub y: u32,
}

impl GroupDim {
    /// Create a new group dim with the given x, and y = 1.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1 }
    }

    /// Create a new group dim with the given x and y.
    pub const fn new_2d(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Total numbers of units per group.
    pub const fn num_elems(&self) -> u32 {
        self.x * self.y
    }
}

/// The number of groups to launch along both axes.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct GroupCount {
    /// The number of groups in the x axis.
    pub x: u32,
    /// The number of groups in the y axis.
    pub y: u32,
}

impl GroupCount {
    /// Create a new group count with x = y = 1.
    pub const fn new_single() -> Self {
        Self { x: 1, y: 1 }
    }

    /// Create a new group count with the given x, and y = 1.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1 }
    }

    /// Create a new group count with the given x and y.
    pub const fn new_2d(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Total number of groups.
    pub const fn num_elems(&self) -> u32 {
        self.x * self.y
    }

    /// Computes the group count covering exactly `grid` units per axis.
    ///
    /// Every axis of the grid must be a positive multiple of the matching group axis: the
    /// runtime never launches partial groups, so units can always rely on every member of
    /// their group reaching a barrier.
    pub fn from_grid(grid: GridDim, group: GroupDim) -> Result<Self, LaunchError> {
        if group.x == 0 || group.y == 0 {
            return Err(InvalidLaunchConfig::EmptyGroup(group).into());
        }
        if grid.x == 0 || grid.y == 0 {
            return Err(InvalidLaunchConfig::EmptyGrid(grid).into());
        }
        if grid.x % group.x != 0 || grid.y % group.y != 0 {
            return Err(InvalidLaunchConfig::GridNotMultiple { grid, group }.into());
        }

        Ok(Self::new_2d(grid.x / group.x, grid.y / group.y))
    }
}

impl Debug for GroupCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("({}, {})", self.x, self.y))
    }
}

/// The total number of units along both axes of a launch, `count * dim` per axis.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridDim {
    /// Units along the x axis.
    pub x: u32,
    /// Units along the y axis.
    pub y: u32,
}

impl GridDim {
    /// A one-dimensional grid of `x` units.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1 }
    }

    /// A two-dimensional grid of `x * y` units.
    pub const fn new_2d(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// A grid of `x * y` units from host sizes, failing when an axis exceeds `u32::MAX`.
    pub fn from_extents(x: usize, y: usize) -> Result<Self, InvalidLaunchConfig> {
        let axis = |extent: usize| {
            u32::try_from(extent).map_err(|_| InvalidLaunchConfig::GridTooLarge {
                extent,
                max: u32::MAX,
            })
        };

        Ok(Self::new_2d(axis(x)?, axis(y)?))
    }

    /// The grid spanned by `count` groups of shape `dim`.
    pub const fn spanned(count: GroupCount, dim: GroupDim) -> Self {
        Self {
            x: count.x * dim.x,
            y: count.y * dim.y,
        }
    }

    /// Total number of units in the grid.
    pub const fn num_elems(&self) -> u64 {
        self.x as u64 * self.y as u64
    }
}

/// Finds the largest divisor of `extent` that is not bigger than `preferred`.
///
/// Used to infer group shapes that tile a grid exactly.
pub fn largest_divisor_up_to(extent: u32, preferred: u32) -> u32 {
    let upper = u32::min(extent, preferred);
    (1..=upper)
        .rev()
        .find(|candidate| extent % candidate == 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn group_count_covers_grid_exactly() {
        let count = GroupCount::from_grid(GridDim::new_2d(64, 12), GroupDim::new_2d(16, 4));

        assert_eq!(count.ok(), Some(GroupCount::new_2d(4, 3)));
    }

    #[test_log::test]
    fn group_count_rejects_partial_groups() {
        let count = GroupCount::from_grid(GridDim::new_1d(100), GroupDim::new_1d(32));

        assert!(matches!(
            count,
            Err(LaunchError::InvalidConfiguration(
                InvalidLaunchConfig::GridNotMultiple { .. }
            ))
        ));
    }

    #[test_log::test]
    fn group_count_rejects_empty_group() {
        let count = GroupCount::from_grid(GridDim::new_1d(32), GroupDim::new_1d(0));

        assert!(matches!(
            count,
            Err(LaunchError::InvalidConfiguration(
                InvalidLaunchConfig::EmptyGroup(_)
            ))
        ));
    }

    #[test_log::test]
    fn grid_extents_must_fit_an_axis() {
        assert_eq!(GridDim::from_extents(3, 1), Ok(GridDim::new_1d(3)));
        assert_eq!(
            GridDim::from_extents(1, u32::MAX as usize + 1),
            Err(InvalidLaunchConfig::GridTooLarge {
                extent: u32::MAX as usize + 1,
                max: u32::MAX
            })
        );
    }

    #[test_log::test]
    fn grid_is_spanned_by_groups() {
        let grid = GridDim::spanned(GroupCount::new_2d(3, 5), GroupDim::new_2d(16, 2));

        assert_eq!(grid, GridDim::new_2d(48, 10));
        assert_eq!(grid.num_elems(), 480);
    }

    #[test_log::test]
    fn divisor_inference() {
        assert_eq!(largest_divisor_up_to(1024, 32), 32);
        assert_eq!(largest_divisor_up_to(96, 64), 48);
        assert_eq!(largest_divisor_up_to(7, 32), 7);
        assert_eq!(largest_divisor_up_to(13, 8), 1);
        assert_eq!(largest_divisor_up_to(1, 8), 1);
    }
}
