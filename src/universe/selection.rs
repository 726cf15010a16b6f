use crate::error::Error;

/// Frames to keep when slicing a universe, by position in frame order.
///
/// Negative positions count from the end, so `-1` is the last frame.
/// Ranges follow half-open slice semantics and are clamped to the frame
/// count; a negative `step` walks backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSelection {
    Position(isize),
    Range {
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    },
    Positions(Vec<isize>),
}

impl FrameSelection {
    /// `start..stop` with unit step.
    pub fn range(start: isize, stop: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: Some(stop),
            step: 1,
        }
    }

    /// Resolves the selection to ascending, distinct positions in `0..len`.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, Error> {
        let mut positions = match self {
            Self::Position(p) => vec![resolve_position(*p, len)?],
            Self::Positions(ps) => ps
                .iter()
                .map(|p| resolve_position(*p, len))
                .collect::<Result<Vec<_>, _>>()?,
            Self::Range { start, stop, step } => resolve_range(*start, *stop, *step, len)?,
        };
        positions.sort_unstable();
        positions.dedup();
        Ok(positions)
    }
}

impl From<isize> for FrameSelection {
    fn from(position: isize) -> Self {
        Self::Position(position)
    }
}

impl From<Vec<isize>> for FrameSelection {
    fn from(positions: Vec<isize>) -> Self {
        Self::Positions(positions)
    }
}

impl From<std::ops::Range<isize>> for FrameSelection {
    fn from(range: std::ops::Range<isize>) -> Self {
        Self::range(range.start, range.end)
    }
}

fn resolve_position(position: isize, len: usize) -> Result<usize, Error> {
    let n = len as isize;
    let resolved = if position < 0 { position + n } else { position };
    if (0..n).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(Error::FramePosition { position, len })
    }
}

fn resolve_range(
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
    len: usize,
) -> Result<Vec<usize>, Error> {
    if step == 0 {
        return Err(Error::configuration("slice step cannot be zero"));
    }
    let n = len as isize;
    let adjust = |bound: isize, lo: isize, hi: isize| {
        let b = if bound < 0 { bound + n } else { bound };
        b.clamp(lo, hi)
    };

    let mut out = Vec::new();
    if step > 0 {
        let mut i = start.map_or(0, |s| adjust(s, 0, n));
        let stop = stop.map_or(n, |s| adjust(s, 0, n));
        while i < stop {
            out.push(i as usize);
            i += step;
        }
    } else {
        let mut i = start.map_or(n - 1, |s| adjust(s, -1, n - 1));
        let stop = stop.map_or(-1, |s| adjust(s, -1, n - 1));
        while i > stop {
            out.push(i as usize);
            i += step;
        }
    }
    Ok(out)
}
