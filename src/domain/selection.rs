//! Selection and outlining phases of a page view

use super::geometry::Point;
use super::table::TableId;

/// What the operator currently has selected
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    #[default]
    NoSelection,
    TableSelected(TableId),
    RowSelected(TableId, usize),
}

impl Selection {
    pub fn table(self) -> Option<TableId> {
        match self {
            Selection::NoSelection => None,
            Selection::TableSelected(table) | Selection::RowSelected(table, _) => Some(table),
        }
    }

    pub fn row(self) -> Option<usize> {
        match self {
            Selection::RowSelected(_, row) => Some(row),
            _ => None,
        }
    }
}

/// Interaction phase of the page view.
///
/// Outlining is a two-click gesture: the first click anchors one corner,
/// the second completes the table.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// First corner placed, in document space
    Outlining { anchor: Point },
    Selected { table: TableId, row: Option<usize> },
}

impl Interaction {
    pub fn selection(self) -> Selection {
        match self {
            Interaction::Idle | Interaction::Outlining { .. } => Selection::NoSelection,
            Interaction::Selected { table, row: None } => Selection::TableSelected(table),
            Interaction::Selected {
                table,
                row: Some(row),
            } => Selection::RowSelected(table, row),
        }
    }

    pub fn is_outlining(self) -> bool {
        matches!(self, Interaction::Outlining { .. })
    }
}
