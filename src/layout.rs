//! Splits report rows into pages of side-by-side blocks.
//!
//! The planner only produces positions; it knows nothing about the
//! document a renderer builds from them.

use std::num::NonZeroUsize;

/// Rows per block in every observed report layout.
pub const DEFAULT_ROWS_PER_BLOCK: NonZeroUsize = match NonZeroUsize::new(43) {
    Some(n) => n,
    None => unreachable!(),
};

/// Blocks laid out side by side on one page.
pub const DEFAULT_BLOCKS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

/// A run of consecutive rows rendered as one column group.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Block<T> {
    pub index: usize,
    pub rows: Vec<T>,
}

/// One page of blocks.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Page<T> {
    pub index: usize,
    pub blocks: Vec<Block<T>>,
}

impl<T> Page<T> {
    pub fn row_count(&self) -> usize {
        self.blocks.iter().map(|block| block.rows.len()).sum()
    }
}

/// Where a row sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct GridPosition {
    pub page: usize,
    pub block: usize,
    pub row: usize,
}

/// Chunks `rows` into blocks of `rows_per_block`, then blocks into pages of
/// `blocks_per_page`.
///
/// The last block and the last page may be short. Zero rows give zero pages.
///
/// # Examples
///
/// ```
/// use stock_trend_report::layout::{paginate, DEFAULT_BLOCKS_PER_PAGE, DEFAULT_ROWS_PER_BLOCK};
///
/// let rows: Vec<u32> = (0..130).collect();
/// let pages = paginate(&rows, DEFAULT_ROWS_PER_BLOCK, DEFAULT_BLOCKS_PER_PAGE);
/// assert_eq!(pages.len(), 2);
/// assert_eq!(pages[1].blocks.len(), 1);
/// assert_eq!(pages[1].blocks[0].rows, vec![129]);
/// ```
pub fn paginate<T: Clone>(
    rows: &[T],
    rows_per_block: NonZeroUsize,
    blocks_per_page: NonZeroUsize,
) -> Vec<Page<T>> {
    let blocks: Vec<Vec<T>> = rows.chunks(rows_per_block.get()).map(<[T]>::to_vec).collect();

    blocks
        .chunks(blocks_per_page.get())
        .enumerate()
        .map(|(page_index, page_blocks)| Page {
            index: page_index,
            blocks: page_blocks
                .iter()
                .enumerate()
                .map(|(block_index, rows)| Block {
                    index: block_index,
                    rows: rows.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Walks every row with its grid position, page by page, block by block.
pub fn positions<T>(pages: &[Page<T>]) -> impl Iterator<Item = (GridPosition, &T)> {
    pages.iter().flat_map(|page| {
        page.blocks.iter().flat_map(move |block| {
            block.rows.iter().enumerate().map(move |(row, item)| {
                (
                    GridPosition {
                        page: page.index,
                        block: block.index,
                        row,
                    },
                    item,
                )
            })
        })
    })
}
