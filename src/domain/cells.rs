//! Row-major grids of per-cell values

use std::collections::{BTreeMap, BTreeSet};

/// Cells indexed as `grid[row][column]`
pub type CellGrid<T> = Vec<Vec<T>>;

/// Flatten a grid, returning the position of every `(row, column)` in the list
pub fn cell_grid_to_list<T>(grid: CellGrid<T>) -> (Vec<T>, BTreeMap<(usize, usize), usize>) {
    let mut cells = Vec::new();
    let mut mapping = BTreeMap::new();
    for (i, row) in grid.into_iter().enumerate() {
        for (j, cell) in row.into_iter().enumerate() {
            mapping.insert((i, j), cells.len());
            cells.push(cell);
        }
    }
    (cells, mapping)
}

/// Rebuild a grid flattened by [`cell_grid_to_list`]
pub fn list_to_cell_grid<T: Clone>(
    cells: &[T],
    mapping: &BTreeMap<(usize, usize), usize>,
) -> CellGrid<T> {
    let mut grid: CellGrid<T> = Vec::new();
    let mut last_row = None;
    for (&(i, _), &index) in mapping {
        if last_row != Some(i) {
            grid.push(Vec::new());
            last_row = Some(i);
        }
        if let (Some(row), Some(cell)) = (grid.last_mut(), cells.get(index)) {
            row.push(cell.clone());
        }
    }
    grid
}

/// Keep only the listed rows, in the given order; unknown indices are skipped
pub fn take_rows<T: Clone>(grid: &CellGrid<T>, rows: &[usize]) -> CellGrid<T> {
    rows.iter().filter_map(|r| grid.get(*r).cloned()).collect()
}

/// Keep only the listed columns of every row
pub fn take_columns<T: Clone>(grid: &CellGrid<T>, columns: &[usize]) -> CellGrid<T> {
    grid.iter()
        .map(|row| columns.iter().filter_map(|c| row.get(*c).cloned()).collect())
        .collect()
}

pub fn drop_rows<T: Clone>(grid: &CellGrid<T>, rows: &[usize]) -> CellGrid<T> {
    let dropped: BTreeSet<usize> = rows.iter().copied().collect();
    let remaining: Vec<usize> = (0..grid.len()).filter(|r| !dropped.contains(r)).collect();
    take_rows(grid, &remaining)
}

pub fn drop_columns<T: Clone>(grid: &CellGrid<T>, columns: &[usize]) -> CellGrid<T> {
    let Some(first) = grid.first() else {
        return Vec::new();
    };
    let dropped: BTreeSet<usize> = columns.iter().copied().collect();
    let remaining: Vec<usize> = (0..first.len()).filter(|c| !dropped.contains(c)).collect();
    take_columns(grid, &remaining)
}

/// Apply `f` to every cell
pub fn map_cells<A, B>(grid: &CellGrid<A>, mut f: impl FnMut(&A) -> B) -> CellGrid<B> {
    grid.iter()
        .map(|row| row.iter().map(&mut f).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> CellGrid<u32> {
        vec![vec![1, 2, 3], vec![4, 5, 6]]
    }

    #[test]
    fn test_list_mapping_restores_grid() {
        let (cells, mapping) = cell_grid_to_list(grid());
        assert_eq!(cells, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(mapping[&(1, 0)], 3);
        let doubled: Vec<u32> = cells.iter().map(|c| c * 2).collect();
        assert_eq!(
            list_to_cell_grid(&doubled, &mapping),
            vec![vec![2, 4, 6], vec![8, 10, 12]]
        );
    }

    #[test]
    fn test_take_and_drop() {
        let grid = grid();
        assert_eq!(take_rows(&grid, &[1, 7]), vec![vec![4, 5, 6]]);
        assert_eq!(take_columns(&grid, &[2, 0]), vec![vec![3, 1], vec![6, 4]]);
        assert_eq!(drop_rows(&grid, &[0]), vec![vec![4, 5, 6]]);
        assert_eq!(drop_columns(&grid, &[1]), vec![vec![1, 3], vec![4, 6]]);
        assert!(drop_columns(&Vec::<Vec<u32>>::new(), &[0]).is_empty());
    }

    #[test]
    fn test_map_cells() {
        assert_eq!(
            map_cells(&grid(), |c| c % 2 == 0),
            vec![vec![false, true, false], vec![true, false, true]]
        );
    }
}
