use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::range::Range;

/// Cells collected from one sheet of a spreadsheet file.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells inside the requested range
    pub(crate) cells: Vec<Cell>,
    /// Expected data range (user-specified)
    pub(super) range: Range,
    /// Whether to drop rows without any cell
    pub(super) skip_empty_rows: bool,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(file_name: &str, name: &str, range: Option<Range>, skip_empty_rows: bool) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            range: range.unwrap_or_default(),
            skip_empty_rows,
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Checks if a row is before the lower bound of the specified range.
    fn before_row_lower_bound(&self, row: usize) -> bool {
        self.range.row_lower_bound
            .map(|row_lower_bound| row < row_lower_bound)
            .unwrap_or(false)
    }

    /// Checks if a row is after the upper bound of the specified range.
    pub(super) fn after_row_upper_bound(&self, row: usize) -> bool {
        self.range.row_upper_bound
            .map(|row_upper_bound| row_upper_bound < row)
            .unwrap_or(false)
    }

    fn before_col_lower_bound(&self, col: usize) -> bool {
        self.range.col_lower_bound
            .map(|col_lower_bound| col < col_lower_bound)
            .unwrap_or(false)
    }

    fn after_col_upper_bound(&self, col: usize) -> bool {
        self.range.col_upper_bound
            .map(|col_upper_bound| col_upper_bound < col)
            .unwrap_or(false)
    }

    /// Checks if a cell at (row, col) is within the specified range.
    pub(super) fn contains(&self, row: usize, col: usize) -> bool {
        !self.before_row_lower_bound(row)
            && !self.after_row_upper_bound(row)
            && !self.before_col_lower_bound(col)
            && !self.after_col_upper_bound(col)
    }

    /// Adds a cell to the sheet, updating the data bounds.
    /// Cells outside the range are ignored.
    pub(super) fn push(&mut self, cell: Cell) {
        if !self.contains(cell.row, cell.col) {
            return;
        }
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Records a row that exists in the source even if all its cells are empty.
    /// Only the upper bound moves, so leading blank rows never become the header.
    pub(super) fn push_row(&mut self, row: usize) {
        if self.before_row_lower_bound(row) || self.after_row_upper_bound(row) {
            return;
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Orders cells row-major once all of them have been pushed.
    pub(super) fn finish(&mut self) {
        self.cells.sort_by_key(|cell| (cell.row, cell.col));
    }

    /// Lays the cells out as a dense grid, one record per row.
    /// Rows start at the range's first row (or the first row with data) and
    /// columns span the range, or the occupied columns when unbounded.
    pub(crate) fn grid(&self) -> Vec<Vec<Option<&Cell>>> {
        let (Some(row_lower), Some(row_upper)) = (
            self.range.row_lower_bound.or(self.row_lower_bound),
            self.row_upper_bound,
        ) else {
            return Vec::new();
        };
        let (Some(col_lower), Some(col_upper)) = (
            self.range.col_lower_bound.or(self.col_lower_bound),
            self.range.col_upper_bound.or(self.col_upper_bound),
        ) else {
            return Vec::new();
        };

        let width = col_upper - col_lower + 1;
        let mut table = Vec::<Vec<Option<&Cell>>>::new();
        let mut cells = self.cells.iter().peekable();
        for row in row_lower..=row_upper {
            let mut record = vec![None; width];
            let mut occupied = false;
            while let Some(cell) = cells.next_if(|cell| cell.row == row) {
                record[cell.col - col_lower] = Some(cell);
                occupied = true;
            }
            if occupied || !self.skip_empty_rows {
                table.push(record);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::cell::{Cell, CellType};
    use crate::spreadsheet::range::Range;
    use crate::spreadsheet::sheet::Sheet;

    fn push(sheet: &mut Sheet, row: usize, col: usize) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: format!("{row}:{col}"),
        });
    }

    fn values(sheet: &Sheet) -> Vec<Vec<Option<String>>> {
        sheet.grid()
            .into_iter()
            .map(|record| record.into_iter().map(|cell| cell.map(|cell| cell.value.to_owned())).collect())
            .collect()
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("", "", None, false);

        assert!(sheet.cells.is_empty());
        assert_eq!(sheet.row_lower_bound, None);
        assert_eq!(sheet.row_upper_bound, None);
        assert_eq!(sheet.col_lower_bound, None);
        assert_eq!(sheet.col_upper_bound, None);
        assert!(sheet.grid().is_empty());
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("", "", None, false);
        push(&mut sheet, 1, 1);
        push(&mut sheet, 1, 3);
        push(&mut sheet, 3, 1);
        push(&mut sheet, 3, 3);
        sheet.finish();

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(3));
        assert_eq!(sheet.col_lower_bound, Some(1));
        assert_eq!(sheet.col_upper_bound, Some(3));

        let grid = values(&sheet);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![Some("1:1".to_owned()), None, Some("1:3".to_owned())]);
        assert_eq!(grid[1], vec![None, None, None]);
        assert_eq!(grid[2], vec![Some("3:1".to_owned()), None, Some("3:3".to_owned())]);
    }

    #[test]
    fn sheet_update_skip_empty_rows() {
        let mut sheet = Sheet::new("", "", None, true);
        push(&mut sheet, 1, 1);
        push(&mut sheet, 3, 3);
        push(&mut sheet, 1, 3);
        push(&mut sheet, 3, 1);
        sheet.finish();

        let grid = values(&sheet);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0], vec![Some("1:1".to_owned()), None, Some("1:3".to_owned())]);
        assert_eq!(grid[1], vec![Some("3:1".to_owned()), None, Some("3:3".to_owned())]);
    }

    #[test]
    fn sheet_trailing_empty_rows() {
        let mut sheet = Sheet::new("", "", None, false);
        sheet.push_row(0);
        push(&mut sheet, 1, 0);
        push(&mut sheet, 2, 0);
        sheet.push_row(4);
        sheet.push_row(3);
        sheet.finish();

        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(4));
        let grid = values(&sheet);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], vec![Some("1:0".to_owned())]);
        assert_eq!(grid[3], vec![None]);

        let mut sheet = Sheet::new("", "", None, true);
        push(&mut sheet, 1, 0);
        sheet.push_row(4);
        sheet.finish();
        assert_eq!(values(&sheet).len(), 1);

        let mut sheet = Sheet::new("", "", Some(Range {
            row_upper_bound: Some(2),
            ..Range::default()
        }), false);
        push(&mut sheet, 0, 0);
        sheet.push_row(5);
        sheet.finish();
        assert_eq!(values(&sheet).len(), 1);
    }

    #[test]
    fn sheet_update_with_range() {
        let mut sheet = Sheet::new("", "", Some(Range {
            row_lower_bound: Some(0),
            row_upper_bound: Some(2),
            col_lower_bound: Some(1),
            col_upper_bound: Some(2),
        }), false);
        push(&mut sheet, 1, 0);
        push(&mut sheet, 1, 1);
        push(&mut sheet, 2, 2);
        push(&mut sheet, 4, 1);
        sheet.finish();

        assert_eq!(sheet.cells.len(), 2);
        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(2));

        let grid = values(&sheet);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![None, None]);
        assert_eq!(grid[1], vec![Some("1:1".to_owned()), None]);
        assert_eq!(grid[2], vec![None, Some("2:2".to_owned())]);
    }
}
