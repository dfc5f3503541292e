//! Looped gallery strip arithmetic.
//!
//! A category gallery shows its images in a horizontal strip that never runs
//! out. The image list is rendered three times; the visitor starts on the
//! first tile of the middle copy, and stepping past either end of the middle
//! copy jumps back into it:
//!
//! ```text
//! copy:      0 0 0 | 1 1 1 | 2 2 2        n = 3
//! position:  0 1 2 | 3 4 5 | 6 7 8
//!                    ^ start = n
//! right from 5 (2n − 1) → 3 (n)
//! left  from 3 (n)      → 5 (2n − 1)
//! ```
//!
//! The active progress dot is `position mod n`. The generator uses
//! [`LoopStrip::tiles`] to lay out the tripled markup; `site.js` repeats the
//! same stepping rules.

/// One rendered tile: which image it shows and which copy it belongs to.
/// `(index, copy)` is stable across re-renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub copy: usize,
}

impl Tile {
    /// Stable DOM key (`"4-1"`).
    pub fn key(&self) -> String {
        format!("{}-{}", self.index, self.copy)
    }

    /// Tiles of the middle copy are the real ones; the outer copies are
    /// decorative and hidden from assistive technology.
    pub fn is_primary(&self) -> bool {
        self.copy == 1
    }
}

/// Position within a tripled strip of `len` images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStrip {
    len: usize,
    position: usize,
}

impl LoopStrip {
    pub const COPIES: usize = 3;

    /// A strip over `len` images, positioned at the start of the middle copy.
    pub fn new(len: usize) -> Self {
        Self { len, position: len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn start(&self) -> usize {
        self.len
    }

    /// Step right, wrapping from the end of the middle copy to its start.
    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.position += 1;
            if self.position >= self.len * 2 {
                self.position = self.len;
            }
        }
        self.position
    }

    /// Step left, wrapping from the start of the middle copy to its end.
    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            if self.position <= self.len {
                self.position = self.len * 2 - 1;
            } else {
                self.position -= 1;
            }
        }
        self.position
    }

    /// Index of the highlighted progress dot.
    pub fn active_dot(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            self.position % self.len
        }
    }

    /// Every tile of the strip, in render order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..Self::COPIES).flat_map(move |copy| (0..self.len).map(move |index| Tile { index, copy }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_middle_copy() {
        let strip = LoopStrip::new(5);
        assert_eq!(strip.position(), 5);
        assert_eq!(strip.active_dot(), 0);
    }

    #[test]
    fn right_wraps_to_middle_start() {
        let mut strip = LoopStrip::new(3);
        assert_eq!(strip.next(), 4);
        assert_eq!(strip.next(), 5);
        assert_eq!(strip.next(), 3);
        assert_eq!(strip.active_dot(), 0);
    }

    #[test]
    fn left_wraps_to_middle_end() {
        let mut strip = LoopStrip::new(3);
        assert_eq!(strip.prev(), 5);
        assert_eq!(strip.active_dot(), 2);
        assert_eq!(strip.prev(), 4);
        assert_eq!(strip.prev(), 3);
        assert_eq!(strip.prev(), 5);
    }

    #[test]
    fn full_lap_returns_to_start() {
        let mut strip = LoopStrip::new(7);
        for _ in 0..7 {
            strip.next();
        }
        assert_eq!(strip.position(), strip.start());
    }

    #[test]
    fn single_image_stays_put() {
        let mut strip = LoopStrip::new(1);
        assert_eq!(strip.next(), 1);
        assert_eq!(strip.prev(), 1);
        assert_eq!(strip.active_dot(), 0);
    }

    #[test]
    fn empty_strip_is_inert() {
        let mut strip = LoopStrip::new(0);
        assert!(strip.is_empty());
        assert_eq!(strip.next(), 0);
        assert_eq!(strip.prev(), 0);
        assert_eq!(strip.tiles().count(), 0);
    }

    #[test]
    fn tiles_are_tripled_with_stable_keys() {
        let strip = LoopStrip::new(2);
        let keys: Vec<String> = strip.tiles().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["0-0", "1-0", "0-1", "1-1", "0-2", "1-2"]);
        let primary: Vec<usize> = strip
            .tiles()
            .filter(Tile::is_primary)
            .map(|t| t.index)
            .collect();
        assert_eq!(primary, vec![0, 1]);
    }
}
