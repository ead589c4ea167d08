//! Position mapping through document edits.

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    /// Stay before inserted content.
    Before,
    /// Move past inserted content.
    #[default]
    After,
}

/// Anything that can translate a pre-edit position to a post-edit one.
pub trait Mappable {
    fn map_assoc(&self, pos: usize, assoc: Assoc) -> usize;

    fn map(&self, pos: usize) -> usize {
        self.map_assoc(pos, Assoc::After)
    }
}

/// One replaced range: `old_size` units at `start` became `new_size` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRange {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

/// The position changes made by a single step. Ranges are sorted by start
/// and expressed in pre-step coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepMap {
    ranges: Vec<MapRange>,
}

impl StepMap {
    pub fn new(ranges: Vec<MapRange>) -> Self {
        Self { ranges }
    }

    /// The identity map.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map for a single replacement.
    pub fn replace(start: usize, old_size: usize, new_size: usize) -> Self {
        Self::new(vec![MapRange {
            start,
            old_size,
            new_size,
        }])
    }
}

impl Mappable for StepMap {
    fn map_assoc(&self, pos: usize, assoc: Assoc) -> usize {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let stick_before = if range.old_size == 0 {
                    assoc == Assoc::Before
                } else if pos == range.start {
                    true
                } else if pos == end {
                    false
                } else {
                    assoc == Assoc::Before
                };
                let within = if stick_before { 0 } else { range.new_size };
                return (range.start as isize + diff) as usize + within;
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        (pos as isize + diff) as usize
    }
}

/// A sequence of step maps applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// The mapping formed by the step maps from index `from` on.
    pub fn slice(&self, from: usize) -> Mapping {
        Mapping {
            maps: self.maps.get(from..).map(<[StepMap]>::to_vec).unwrap_or_default(),
        }
    }
}

impl Mappable for Mapping {
    fn map_assoc(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps
            .iter()
            .fold(pos, |pos, map| map.map_assoc(pos, assoc))
    }
}
