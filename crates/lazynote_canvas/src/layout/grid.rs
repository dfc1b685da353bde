//! Row-major grid placement.

use super::{LayoutConfig, LayoutGraph};
use crate::model::Point;

/// Places nodes in id order on a grid with `ceil(sqrt(n))` columns.
///
/// Every cell is as large as the largest node plus `config.margin`, so
/// mixed node sizes never overlap.
pub(super) fn place(graph: &LayoutGraph<'_>, config: &LayoutConfig) -> Vec<Point> {
    let count = graph.len();
    let columns = (count as f64).sqrt().ceil().max(1.0) as usize;
    let pitch_x = graph.max_width() + config.margin;
    let pitch_y = graph.max_height() + config.margin;

    (0..count)
        .map(|index| {
            let column = index % columns;
            let row = index / columns;
            config
                .origin
                .offset(column as f64 * pitch_x, row as f64 * pitch_y)
        })
        .collect()
}
