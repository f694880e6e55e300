//! Range fixes for mirroring transformation constraints.
//!
//! The tables list, for every (map_from, map_to, destination axis, source
//! axis), how the destination range is rewritten, and for every (map_from,
//! source axis) how the source range is rewritten. They are literal: the host
//! does not mirror its rotation and location bases uniformly, so the cells are
//! not one reflection rule applied everywhere.
//!
//! Confirmed cells:
//! - location X to rotation X swaps the destination range.
//! - rotation Y to rotation Y leaves both ranges as they are.
//!
//! The remaining cells are unconfirmed against the host. They assume location
//! X, rotation Y and rotation Z change sign under the mirror, which the rotation
//! Y cell above already contradicts. A cell that disagrees with the host is a
//! table typo and gets its own case test when corrected.

use rigkit_ir::live::{Axis, TransformChannel, TransformMapping};

/// How a `(min, max)` pair is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFix {
    /// `(min, max)`
    Identity,
    /// `(-min, -max)`
    Negate,
    /// `(max, min)`
    Swap,
    /// `(-max, -min)`
    NegateSwap,
}

impl RangeFix {
    /// Applies the fix to a range.
    pub fn apply(self, min: f64, max: f64) -> (f64, f64) {
        match self {
            RangeFix::Identity => (min, max),
            RangeFix::Negate => (-min, -max),
            RangeFix::Swap => (max, min),
            RangeFix::NegateSwap => (-max, -min),
        }
    }
}

use RangeFix::{Identity as I, Negate as N, NegateSwap as B, Swap as S};

/// Destination range fixes, indexed `[map_from][map_to][to_axis][from_axis]`.
const TO_RANGE_FIXES: [[[[RangeFix; 3]; 3]; 3]; 3] = [
    // From location
    [
        // to location
        [[B, N, N], [S, I, I], [S, I, I]],
        // to rotation, [X][X] confirmed
        [[S, I, I], [B, N, N], [B, N, N]],
        // to scale
        [[S, I, I], [S, I, I], [S, I, I]],
    ],
    // From rotation
    [
        [[N, B, B], [I, S, S], [I, S, S]],
        // to rotation, [Y][Y] confirmed
        [[I, S, S], [N, I, B], [N, B, B]],
        [[I, S, S], [I, S, S], [I, S, S]],
    ],
    // From scale
    [
        [[N, N, N], [I, I, I], [I, I, I]],
        [[I, I, I], [N, N, N], [N, N, N]],
        [[I, I, I], [I, I, I], [I, I, I]],
    ],
];

/// Source range fixes, indexed `[map_from][from_axis]`. Rotation Y is confirmed.
const FROM_RANGE_FIXES: [[RangeFix; 3]; 3] = [[B, I, I], [I, I, B], [I, I, I]];

/// Returns the fix for the destination range of `to_axis` fed by `from_axis`.
pub fn to_range_fix(
    map_from: TransformChannel,
    map_to: TransformChannel,
    to_axis: Axis,
    from_axis: Axis,
) -> RangeFix {
    TO_RANGE_FIXES[map_from.index()][map_to.index()][to_axis.index()][from_axis.index()]
}

/// Returns the fix for the source range of `from_axis`.
pub fn from_range_fix(map_from: TransformChannel, from_axis: Axis) -> RangeFix {
    FROM_RANGE_FIXES[map_from.index()][from_axis.index()]
}

/// Returns the mapping as seen from the X-mirrored bone.
///
/// Only the active channels (`map_from` for source ranges, `map_to` for
/// destination ranges) are rewritten; inactive ranges are copied.
pub fn mirror_mapping(mapping: &TransformMapping) -> TransformMapping {
    let mut mirrored = mapping.clone();

    let from = mirrored.from.get_mut(mapping.map_from);
    for axis in Axis::ALL {
        let i = axis.index();
        let (min, max) = from_range_fix(mapping.map_from, axis).apply(from.min[i], from.max[i]);
        from.min[i] = min;
        from.max[i] = max;
    }

    let to = mirrored.to.get_mut(mapping.map_to);
    for to_axis in Axis::ALL {
        let j = to_axis.index();
        let fix = to_range_fix(
            mapping.map_from,
            mapping.map_to,
            to_axis,
            mapping.source_axis(to_axis),
        );
        let (min, max) = fix.apply(to.min[j], to.max[j]);
        to.min[j] = min;
        to.max[j] = max;
    }

    mirrored
}
