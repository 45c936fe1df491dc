//! Logical-to-physical index mapping.
//!
//! An [`Address`] describes how the logical `(row, col)` coordinates of a
//! matrix or vector view land in a flat shared buffer:
//!
//! ```text
//! physical = base + rows.part(row) + cols.part(col)
//! ```
//!
//! where a [`Axis::Direct`] axis contributes `i * stride` and an
//! [`Axis::Mapped`] axis looks the contribution up in a shared index table.
//! Sub-ranges, index selections and transposition all compose into a new
//! flat descriptor, so a view never walks a chain of parents at access time.
//!
//! Public coordinates honour the view's [`Indexing`] convention: a Fortran
//! view accepts `1..=n`, a zero-based view `0..n`. Cursors returned by
//! [`Address::offset`] advance incrementally so hot loops avoid recomputing
//! the full mapping.

use std::rc::Rc;

use ql_core::{
    ensure,
    errors::{Error, Result},
    Size,
};

// ── Indexing convention ───────────────────────────────────────────────────────

/// First valid logical coordinate of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Indexing {
    /// Coordinates start at 0.
    #[default]
    ZeroBased,
    /// Coordinates start at 1.
    Fortran,
}

impl Indexing {
    /// The first valid coordinate (0 or 1).
    #[inline]
    pub fn first(self) -> Size {
        match self {
            Indexing::ZeroBased => 0,
            Indexing::Fortran => 1,
        }
    }

    /// Convert a logical coordinate into a zero-based one, checking it
    /// against `extent`.
    #[inline]
    pub(crate) fn locate(self, logical: Size, extent: Size) -> Result<Size> {
        let first = self.first();
        if logical < first || logical - first >= extent {
            return Err(Error::IndexOutOfRange {
                index: logical,
                size: extent,
            });
        }
        Ok(logical - first)
    }

    /// Convert a logical half-open range `[from, to)` into a zero-based one.
    pub(crate) fn locate_range(self, from: Size, to: Size, extent: Size) -> Result<(Size, Size)> {
        let first = self.first();
        if from < first || from - first > extent {
            return Err(Error::IndexOutOfRange {
                index: from,
                size: extent,
            });
        }
        if to < first || to - first > extent {
            return Err(Error::IndexOutOfRange {
                index: to,
                size: extent,
            });
        }
        ensure!(from <= to, "invalid backward indexing: [{from}, {to})");
        Ok((from - first, to - first))
    }
}

// ── Axis ──────────────────────────────────────────────────────────────────────

/// One logical dimension of a view.
#[derive(Debug, Clone)]
pub enum Axis {
    /// Evenly spaced elements: logical `i` contributes `i * stride`.
    Direct {
        /// Number of logical positions.
        extent: Size,
        /// Physical distance between consecutive positions.
        stride: Size,
    },
    /// Arbitrary positions: logical `i` contributes `offsets[start + i]`.
    ///
    /// Narrowing a mapped axis moves the window and shares the table.
    Mapped {
        /// Physical contributions, shared between views.
        offsets: Rc<[Size]>,
        /// First table entry in the window.
        start: Size,
        /// Number of logical positions.
        extent: Size,
    },
}

impl Axis {
    /// Mapped axis over the whole of `offsets`.
    pub fn mapped(offsets: impl Into<Rc<[Size]>>) -> Self {
        let offsets = offsets.into();
        Axis::Mapped {
            extent: offsets.len(),
            offsets,
            start: 0,
        }
    }

    /// Number of logical positions along the axis.
    #[inline]
    pub fn extent(&self) -> Size {
        match self {
            Axis::Direct { extent, .. } | Axis::Mapped { extent, .. } => *extent,
        }
    }

    /// Physical contribution of zero-based position `i`.
    #[inline]
    pub fn part(&self, i: Size) -> Size {
        match self {
            Axis::Direct { stride, .. } => i * stride,
            Axis::Mapped { offsets, start, .. } => offsets[start + i],
        }
    }

    /// The table entries visible through a mapped axis.
    fn window(&self) -> Option<&[Size]> {
        match self {
            Axis::Direct { .. } => None,
            Axis::Mapped {
                offsets,
                start,
                extent,
            } => Some(&offsets[*start..start + extent]),
        }
    }

    /// Consecutive positions are adjacent in the buffer.
    fn is_unit(&self) -> bool {
        match self {
            Axis::Direct { extent, stride } => *extent <= 1 || *stride == 1,
            Axis::Mapped { extent, .. } => *extent <= 1,
        }
    }

    /// Largest contribution, or `None` for an empty axis.
    fn max_part(&self) -> Option<Size> {
        match self {
            Axis::Direct { extent: 0, .. } => None,
            Axis::Direct { extent, stride } => Some((extent - 1) * stride),
            Axis::Mapped { .. } => self.window().and_then(|w| w.iter().copied().max()),
        }
    }

    /// Restrict to the zero-based positions `[from, to)`.
    ///
    /// Returns the shift to add to the base offset together with the
    /// narrowed axis.
    fn slice(&self, from: Size, to: Size) -> (Size, Axis) {
        match self {
            Axis::Direct { stride, .. } => (
                from * stride,
                Axis::Direct {
                    extent: to - from,
                    stride: *stride,
                },
            ),
            Axis::Mapped { offsets, start, .. } => (
                0,
                Axis::Mapped {
                    offsets: Rc::clone(offsets),
                    start: start + from,
                    extent: to - from,
                },
            ),
        }
    }

    /// Pick the zero-based positions in `indices`, in order.
    fn select(&self, indices: &[Size]) -> Axis {
        Axis::mapped(indices.iter().map(|&i| self.part(i)).collect::<Rc<[Size]>>())
    }
}

impl PartialEq for Axis {
    /// Axes are equal when they map every logical position the same way.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Axis::Direct { extent, stride },
                Axis::Direct {
                    extent: other_extent,
                    stride: other_stride,
                },
            ) => extent == other_extent && (stride == other_stride || *extent <= 1),
            _ => {
                self.extent() == other.extent()
                    && (0..self.extent()).all(|i| self.part(i) == other.part(i))
            }
        }
    }
}

/// Which positions of one axis a new view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// The whole axis.
    All,
    /// A single logical position.
    Single(Size),
    /// The logical half-open range `[from, to)`.
    Range(Size, Size),
    /// An arbitrary list of logical positions (repeats allowed).
    Indices(&'a [Size]),
}

// ── Address ───────────────────────────────────────────────────────────────────

/// Mapping of a rows × cols view onto a flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    base: Size,
    rows: Axis,
    cols: Axis,
    indexing: Indexing,
}

impl Address {
    /// Dense row-major layout of a fresh `rows × cols` buffer.
    pub fn dense(rows: Size, cols: Size, indexing: Indexing) -> Self {
        Self {
            base: 0,
            rows: Axis::Direct {
                extent: rows,
                stride: cols,
            },
            cols: Axis::Direct {
                extent: cols,
                stride: 1,
            },
            indexing,
        }
    }

    /// Number of logical rows.
    #[inline]
    pub fn rows(&self) -> Size {
        self.rows.extent()
    }

    /// Number of logical columns.
    #[inline]
    pub fn cols(&self) -> Size {
        self.cols.extent()
    }

    /// Number of addressable elements.
    #[inline]
    pub fn size(&self) -> Size {
        self.rows() * self.cols()
    }

    /// The row axis.
    pub fn row_axis(&self) -> &Axis {
        &self.rows
    }

    /// The column axis.
    pub fn col_axis(&self) -> &Axis {
        &self.cols
    }

    /// Indexing convention of the public coordinates.
    #[inline]
    pub fn indexing(&self) -> Indexing {
        self.indexing
    }

    /// Whether logical coordinates start at 1.
    #[inline]
    pub fn is_fortran(&self) -> bool {
        self.indexing == Indexing::Fortran
    }

    /// Physical offset of the first logical element (or of the view origin
    /// when empty).
    pub fn base(&self) -> Size {
        if self.size() == 0 {
            self.base
        } else {
            self.at(0, 0)
        }
    }

    /// One past the largest physical offset the view can touch.
    pub fn last(&self) -> Size {
        match (self.rows.max_part(), self.cols.max_part()) {
            (Some(r), Some(c)) => self.base + r + c + 1,
            _ => self.base,
        }
    }

    /// Whether a row-major walk of the view visits one unbroken run
    /// `[base(), base() + size())`.
    pub fn is_contiguous(&self) -> bool {
        if self.size() == 0 {
            return true;
        }
        if !self.cols.is_unit() {
            return false;
        }
        match &self.rows {
            Axis::Direct { extent, stride } => *extent <= 1 || *stride == self.cols(),
            Axis::Mapped { extent, .. } => *extent <= 1,
        }
    }

    /// Physical offset of zero-based `(r, c)`; no bounds checking.
    #[inline]
    pub(crate) fn at(&self, r: Size, c: Size) -> Size {
        self.base + self.rows.part(r) + self.cols.part(c)
    }

    /// Physical offset of the logical coordinate `(row, col)`.
    pub fn op(&self, row: Size, col: Size) -> Result<Size> {
        let r = self.indexing.locate(row, self.rows())?;
        let c = self.indexing.locate(col, self.cols())?;
        Ok(self.at(r, c))
    }

    /// Physical offset of the logical flat index `index` (row-major).
    pub fn op_index(&self, index: Size) -> Result<Size> {
        let i = self.indexing.locate(index, self.size())?;
        let cols = self.cols();
        Ok(self.at(i / cols, i % cols))
    }

    /// Cursor positioned on the first element.
    pub fn offset(&self) -> Offset<'_> {
        Offset::new(self, 0, 0)
    }

    /// Cursor positioned on the logical coordinate `(row, col)`.
    pub fn offset_at(&self, row: Size, col: Size) -> Result<Offset<'_>> {
        let r = self.indexing.locate(row, self.rows())?;
        let c = self.indexing.locate(col, self.cols())?;
        Ok(Offset::new(self, r, c))
    }

    /// Cursor positioned on the logical flat index `index`.
    pub fn offset_at_index(&self, index: Size) -> Result<Offset<'_>> {
        let i = self.indexing.locate(index, self.size())?;
        let cols = self.cols();
        Ok(Offset::new(self, i / cols, i % cols))
    }

    /// Physical offsets of all elements in row-major logical order.
    pub fn iter(&self) -> Offsets<'_> {
        Offsets {
            cursor: self.offset(),
            remaining: self.size(),
        }
    }

    /// Same mapping under another indexing convention.
    pub fn with_indexing(&self, indexing: Indexing) -> Self {
        Self {
            indexing,
            ..self.clone()
        }
    }

    /// Same mapping with 1-based coordinates.
    pub fn to_fortran(&self) -> Self {
        self.with_indexing(Indexing::Fortran)
    }

    /// Same mapping with 0-based coordinates.
    pub fn to_zero_based(&self) -> Self {
        self.with_indexing(Indexing::ZeroBased)
    }

    /// Rows and columns swapped; no data moves.
    pub fn transposed(&self) -> Self {
        Self {
            base: self.base,
            rows: self.cols.clone(),
            cols: self.rows.clone(),
            indexing: self.indexing,
        }
    }

    /// Carve a sub-view. Coordinates in `rows` and `cols` are logical.
    pub fn select(&self, rows: Selection<'_>, cols: Selection<'_>) -> Result<Self> {
        let (row_shift, rows) = Self::narrow(&self.rows, rows, self.indexing)?;
        let (col_shift, cols) = Self::narrow(&self.cols, cols, self.indexing)?;
        Ok(Self {
            base: self.base + row_shift + col_shift,
            rows,
            cols,
            indexing: self.indexing,
        })
    }

    fn narrow(axis: &Axis, selection: Selection<'_>, indexing: Indexing) -> Result<(Size, Axis)> {
        let extent = axis.extent();
        match selection {
            Selection::All => Ok((0, axis.clone())),
            Selection::Single(i) => {
                let i = indexing.locate(i, extent)?;
                Ok(axis.slice(i, i + 1))
            }
            Selection::Range(from, to) => {
                let (from, to) = indexing.locate_range(from, to, extent)?;
                Ok(axis.slice(from, to))
            }
            Selection::Indices(indices) => {
                let located = indices
                    .iter()
                    .map(|&i| indexing.locate(i, extent))
                    .collect::<Result<Vec<_>>>()?;
                Ok((0, axis.select(&located)))
            }
        }
    }
}

// ── Cursors ───────────────────────────────────────────────────────────────────

/// Incremental position inside an [`Address`].
///
/// Moving along a direct axis costs one addition. Moving past the extent
/// of the view is not checked; callers bound their loops with `rows()`,
/// `cols()` or `size()`.
#[derive(Debug, Clone)]
pub struct Offset<'a> {
    addr: &'a Address,
    row: Size,
    col: Size,
    row_part: Size,
    col_part: Size,
}

impl<'a> Offset<'a> {
    fn new(addr: &'a Address, row: Size, col: Size) -> Self {
        let mut cursor = Self {
            addr,
            row,
            col,
            row_part: 0,
            col_part: 0,
        };
        cursor.refresh_row();
        cursor.refresh_col();
        cursor
    }

    #[inline]
    fn refresh_row(&mut self) {
        if self.row < self.addr.rows() {
            self.row_part = self.addr.rows.part(self.row);
        }
    }

    #[inline]
    fn refresh_col(&mut self) {
        if self.col < self.addr.cols() {
            self.col_part = self.addr.cols.part(self.col);
        }
    }

    /// Physical offset of the current position.
    #[inline]
    pub fn op(&self) -> Size {
        self.addr.base + self.row_part + self.col_part
    }

    /// Current zero-based row.
    pub fn row(&self) -> Size {
        self.row
    }

    /// Current zero-based column.
    pub fn col(&self) -> Size {
        self.col
    }

    /// Advance one row.
    #[inline]
    pub fn next_row(&mut self) -> &mut Self {
        self.row += 1;
        match &self.addr.rows {
            Axis::Direct { stride, .. } => self.row_part += stride,
            Axis::Mapped { .. } => self.refresh_row(),
        }
        self
    }

    /// Step back one row.
    #[inline]
    pub fn prev_row(&mut self) -> &mut Self {
        self.row = self.row.wrapping_sub(1);
        match &self.addr.rows {
            Axis::Direct { stride, .. } => self.row_part = self.row_part.wrapping_sub(*stride),
            Axis::Mapped { .. } => self.refresh_row(),
        }
        self
    }

    /// Advance one column.
    #[inline]
    pub fn next_col(&mut self) -> &mut Self {
        self.col += 1;
        match &self.addr.cols {
            Axis::Direct { stride, .. } => self.col_part += stride,
            Axis::Mapped { .. } => self.refresh_col(),
        }
        self
    }

    /// Step back one column.
    #[inline]
    pub fn prev_col(&mut self) -> &mut Self {
        self.col = self.col.wrapping_sub(1);
        match &self.addr.cols {
            Axis::Direct { stride, .. } => self.col_part = self.col_part.wrapping_sub(*stride),
            Axis::Mapped { .. } => self.refresh_col(),
        }
        self
    }

    /// Advance one element in row-major order.
    #[inline]
    pub fn next_index(&mut self) -> &mut Self {
        if self.col + 1 < self.addr.cols() {
            self.next_col()
        } else {
            self.col = 0;
            self.refresh_col();
            self.next_row()
        }
    }

    /// Jump to the logical row `row`, keeping the column.
    pub fn set_row(&mut self, row: Size) -> &mut Self {
        self.row = row.wrapping_sub(self.addr.indexing.first());
        self.refresh_row();
        self
    }

    /// Jump to the logical column `col`, keeping the row.
    pub fn set_col(&mut self, col: Size) -> &mut Self {
        self.col = col.wrapping_sub(self.addr.indexing.first());
        self.refresh_col();
        self
    }

    /// Jump to the logical flat index `index` (row-major).
    pub fn set_index(&mut self, index: Size) -> &mut Self {
        let i = index.wrapping_sub(self.addr.indexing.first());
        let cols = self.addr.cols().max(1);
        self.row = i / cols;
        self.col = i % cols;
        self.refresh_row();
        self.refresh_col();
        self
    }
}

/// Iterator over the physical offsets of a view in row-major order.
#[derive(Debug, Clone)]
pub struct Offsets<'a> {
    cursor: Offset<'a>,
    remaining: Size,
}

impl Iterator for Offsets<'_> {
    type Item = Size;

    #[inline]
    fn next(&mut self) -> Option<Size> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self.cursor.op();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.cursor.next_index();
        }
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Offsets<'_> {}
