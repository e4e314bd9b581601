//! Vertex annotations and greedy overlap reduction.
//!
//! Labels are built fresh for every frame, resolved once by [`LabelPlacer::place`] and then
//! drawn. Placement is best effort: a bounded number of offset flips is tried per label and
//! dense clusters may still overlap afterwards.

use crate::foundation::core::Rgba8;

/// Distance in pixels between a label's anchor and its drawn center, per axis.
pub const LABEL_OFFSET: i32 = 14;

/// Labels whose drawn centers are closer than this are considered overlapping.
pub const DEFAULT_MIN_DISTANCE: f64 = 5.0;

/// Which side of the ring a label annotates; holes push labels the opposite way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelSide {
    Outer,
    Hole,
}

impl LabelSide {
    pub fn sign(self) -> i32 {
        match self {
            Self::Outer => 1,
            Self::Hole => -1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    text: String,
    anchor: (i32, i32),
    reference: (i32, i32),
    sign: i32,
    size: f32,
    color: Rgba8,
    offset: (i32, i32),
}

impl Label {
    /// `reference` is the point the label is pushed away from (usually the ring's center).
    pub fn new(
        text: impl Into<String>,
        anchor: (i32, i32),
        reference: (i32, i32),
        side: LabelSide,
        size: f32,
        color: Rgba8,
    ) -> Self {
        let sign = side.sign();
        let mut label = Self {
            text: text.into(),
            anchor,
            reference,
            sign,
            size,
            color,
            offset: (0, 0),
        };
        label.set_offset_signs(sign, sign);
        label
    }

    fn set_offset_signs(&mut self, sign_x: i32, sign_y: i32) {
        let (x, y) = self.anchor;
        let (mx, my) = self.reference;
        let ox = if x < mx { -LABEL_OFFSET } else { LABEL_OFFSET };
        let oy = if y < my { -LABEL_OFFSET } else { LABEL_OFFSET };
        self.offset = (ox * sign_x, oy * sign_y);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn anchor(&self) -> (i32, i32) {
        self.anchor
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    /// Center of the drawn text.
    pub fn position(&self) -> (i32, i32) {
        (
            self.anchor.0.saturating_add(self.offset.0),
            self.anchor.1.saturating_add(self.offset.1),
        )
    }

    pub fn distance(&self, other: &Label) -> f64 {
        let (ax, ay) = self.position();
        let (bx, by) = other.position();
        (f64::from(ax) - f64::from(bx)).hypot(f64::from(ay) - f64::from(by))
    }
}

/// The offset sign combinations a competing label tries, in order: both axes flipped, only
/// the horizontal one, only the vertical one, then the default.
const RETRY_FLIPS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacer {
    min_distance: f64,
}

impl Default for LabelPlacer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISTANCE)
    }
}

impl LabelPlacer {
    pub fn new(min_distance: f64) -> Self {
        Self { min_distance }
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    fn too_close(&self, a: &Label, b: &Label) -> bool {
        a.distance(b) < self.min_distance
    }

    /// Resolve overlaps and hand back the labels in their original order.
    pub fn place(&self, mut labels: Vec<Label>) -> Vec<Label> {
        if labels.len() < 2 {
            return labels;
        }

        // Pairwise scan. The later label of every close pair is flipped right away, so later
        // comparisons see the flipped position. Clashes are grouped by the earlier label in
        // the order they are first found.
        let mut clashes: Vec<(usize, Vec<usize>)> = Vec::new();
        for i in 0..labels.len() {
            for j in (i + 1)..labels.len() {
                if !self.too_close(&labels[i], &labels[j]) {
                    continue;
                }
                match clashes.iter_mut().find(|(primary, _)| *primary == i) {
                    Some((_, others)) => others.push(j),
                    None => clashes.push((i, vec![j])),
                }
                let sign = labels[j].sign;
                labels[j].set_offset_signs(-sign, -sign);
            }
        }

        for (primary, others) in &clashes {
            let mut fixed = vec![*primary];
            for &other in others {
                let sign = labels[other].sign;
                for (fx, fy) in RETRY_FLIPS {
                    if !self.close_to_any(&labels, other, &fixed) {
                        break;
                    }
                    labels[other].set_offset_signs(sign * fx, sign * fy);
                }
                fixed.push(other);
            }
        }

        labels
    }

    fn close_to_any(&self, labels: &[Label], idx: usize, fixed: &[usize]) -> bool {
        fixed
            .iter()
            .filter(|&&f| f != idx)
            .any(|&f| self.too_close(&labels[idx], &labels[f]))
    }
}
