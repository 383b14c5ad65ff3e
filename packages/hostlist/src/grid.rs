//! Occupancy grid for rendering multi-dimensional host lists as bounding boxes.
//!
//! Every point of a `dims`-dimensional torus has one bit in the grid. The renderer sets the
//! bits of every host in the list, then describes the set bits as a short list of boxes
//! (`000x11Z`) and single points (`0A0`).

use itertools::Itertools;
use parking_lot::Mutex;
use tracing::debug;

use crate::HostRange;
use crate::coords::{Coords, digit_char, from_coords, to_coords, volume};

/// Shared by all renders. Grown to fit the largest dimensionality seen, never shrunk.
static GRID: Mutex<DimensionGrid> = Mutex::new(DimensionGrid::new());

const WORD_BITS: u64 = 64;

/// An axis-aligned box of torus points, inclusive at both corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CoordBox {
    lo: Coords,
    hi: Coords,
}

impl CoordBox {
    fn point(point: Coords) -> Self {
        Self {
            lo: point,
            hi: point,
        }
    }

    /// The part of this box at position `at` along `axis`.
    fn slice(&self, axis: usize, at: u8) -> Self {
        let mut slice = *self;
        slice.lo[axis] = at;
        slice.hi[axis] = at;
        slice
    }

    fn write(&self, out: &mut String, dims: usize) {
        out.extend(self.lo.iter().take(dims).map(|&c| digit_char(c)));

        if self.lo != self.hi {
            out.push('x');
            out.extend(self.hi.iter().take(dims).map(|&c| digit_char(c)));
        }
    }
}

#[derive(Debug)]
pub(crate) struct DimensionGrid {
    bits: Vec<u64>,
    dims: usize,
}

impl DimensionGrid {
    const fn new() -> Self {
        Self {
            bits: Vec::new(),
            dims: 0,
        }
    }

    /// Clears the grid and makes sure it can hold every point of a `dims`-dimensional torus.
    fn prepare(&mut self, dims: usize) {
        let words = usize::try_from(volume(dims).div_ceil(WORD_BITS))
            .expect("a torus of at most MAX_DIMENSIONS axes fits in memory");

        if self.bits.len() < words {
            debug!(dims, words, "growing dimension grid");
            self.bits.resize(words, 0);
        }

        self.dims = dims;
        self.bits.iter_mut().take(words).for_each(|word| *word = 0);
    }

    fn locate(value: u64) -> (usize, u64) {
        let word = usize::try_from(value / WORD_BITS).unwrap_or(usize::MAX);
        (word, 1 << (value % WORD_BITS))
    }

    fn set(&mut self, value: u64) {
        let (word, mask) = Self::locate(value);
        if let Some(word) = self.bits.get_mut(word) {
            *word |= mask;
        }
    }

    fn unset(&mut self, value: u64) {
        let (word, mask) = Self::locate(value);
        if let Some(word) = self.bits.get_mut(word) {
            *word &= !mask;
        }
    }

    fn is_set(&self, value: u64) -> bool {
        let (word, mask) = Self::locate(value);
        self.bits.get(word).is_some_and(|word| word & mask != 0)
    }

    /// Visits every point of `area` in ascending numeric order until `visit` returns `false`.
    /// Returns whether every point was visited.
    fn visit(&self, area: &CoordBox, mut visit: impl FnMut(Coords, u64) -> bool) -> bool {
        let dims = self.dims;
        let mut point = area.lo;

        loop {
            if !visit(point, from_coords(&point, dims)) {
                return false;
            }

            let Some(axis) = (0..dims).rev().find(|&axis| point[axis] < area.hi[axis]) else {
                return true;
            };

            point[axis] += 1;
            for inner in axis + 1..dims {
                point[inner] = area.lo[inner];
            }
        }
    }

    fn is_full(&self, area: &CoordBox) -> bool {
        self.visit(area, |_, value| self.is_set(value))
    }

    fn clear(&mut self, area: &CoordBox) {
        let mut values = Vec::new();
        self.visit(area, |_, value| {
            values.push(value);
            true
        });

        for value in values {
            self.unset(value);
        }
    }

    /// Tightest box around the set points inside `area`, or `None` if there are none.
    fn bounds(&self, area: &CoordBox) -> Option<CoordBox> {
        let dims = self.dims;
        let mut bounds: Option<CoordBox> = None;

        self.visit(area, |point, value| {
            if self.is_set(value) {
                let b = bounds.get_or_insert(CoordBox::point(point));
                for axis in 0..dims {
                    b.lo[axis] = b.lo[axis].min(point[axis]);
                    b.hi[axis] = b.hi[axis].max(point[axis]);
                }
            }
            true
        });

        bounds
    }

    fn first_set(&self, area: &CoordBox) -> Option<Coords> {
        let mut first = None;

        self.visit(area, |point, value| {
            if self.is_set(value) {
                first = Some(point);
                false
            } else {
                true
            }
        });

        first
    }

    /// Covers every set point with boxes, clearing the grid in the process.
    ///
    /// The cover is greedy: full slabs along the first axis go first, then boxes grown from
    /// the first remaining point. It is exact but not always the smallest possible cover.
    fn cover(&mut self, mut area: CoordBox) -> Vec<CoordBox> {
        let dims = self.dims;
        let mut boxes = Vec::new();

        while let Some(bounds) = self.bounds(&area) {
            area = bounds;

            if self.is_full(&bounds) {
                self.clear(&bounds);
                boxes.push(bounds);
                break;
            }

            // Runs of completely filled slabs along the first axis.
            let mut found_slab = false;
            let mut x = bounds.lo[0];

            while x <= bounds.hi[0] {
                let mut slab = bounds.slice(0, x);

                if self.is_full(&slab) {
                    while slab.hi[0] < bounds.hi[0]
                        && self.is_full(&bounds.slice(0, slab.hi[0] + 1))
                    {
                        slab.hi[0] += 1;
                    }

                    x = slab.hi[0];
                    self.clear(&slab);
                    boxes.push(slab);
                    found_slab = true;
                }

                x += 1;
            }

            if found_slab {
                continue;
            }

            // No full slab: grow a box from the first remaining point, innermost axis first.
            let Some(start) = self.first_set(&bounds) else {
                break;
            };

            let mut grown = CoordBox::point(start);

            for axis in (0..dims).rev() {
                while grown.hi[axis] < bounds.hi[axis]
                    && self.is_full(&grown.slice(axis, grown.hi[axis] + 1))
                {
                    grown.hi[axis] += 1;
                }
            }

            self.clear(&grown);
            boxes.push(grown);
        }

        boxes.sort_by(|a, b| a.lo.cmp(&b.lo));
        boxes
    }
}

/// Whether every range can be placed on the grid: numeric, written as a full coordinate tuple
/// and inside the torus.
pub(crate) fn fits(ranges: &[HostRange], dims: usize) -> bool {
    let limit = volume(dims);

    ranges
        .iter()
        .all(|range| !range.is_single_host() && range.width() == dims && range.hi() < limit)
}

/// Renders the distinct points of `ranges` as `prefix` followed by a single coordinate tuple,
/// one bounding box or a bracketed list of boxes and points.
///
/// Every range must satisfy [`fits()`] and have the prefix `prefix`.
pub(crate) fn render_boxes(prefix: &str, ranges: &[HostRange], dims: usize) -> String {
    let mut grid = GRID.lock();
    grid.prepare(dims);

    let mut bounds: Option<CoordBox> = None;

    for range in ranges {
        for value in range.lo()..=range.hi() {
            grid.set(value);

            let point = to_coords(value, dims);
            let b = bounds.get_or_insert(CoordBox::point(point));
            for axis in 0..dims {
                b.lo[axis] = b.lo[axis].min(point[axis]);
                b.hi[axis] = b.hi[axis].max(point[axis]);
            }
        }
    }

    let mut out = prefix.to_owned();

    let Some(bounds) = bounds else {
        return out;
    };

    if bounds.lo == bounds.hi {
        bounds.write(&mut out, dims);
    } else if grid.is_full(&bounds) {
        out.push('[');
        bounds.write(&mut out, dims);
        out.push(']');
    } else {
        let covered = grid.cover(bounds);
        let items = covered
            .iter()
            .map(|b| {
                let mut item = String::new();
                b.write(&mut item, dims);
                item
            })
            .join(",");

        out.push('[');
        out.push_str(&items);
        out.push(']');
    }

    out
}
