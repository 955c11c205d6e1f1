use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_FLING_FACTOR: f64 = 60.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapError {
    #[error("no snap target: max index {max_index} is negative")]
    InvalidRange { max_index: i64 },

    #[error("item pitch must be a positive finite number, got {pitch}")]
    InvalidPitch { pitch: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ItemPitch(f64);

impl ItemPitch {
    pub fn new(pitch: f64) -> Result<Self, SnapError> {
        if pitch.is_finite() && pitch > 0.0 {
            Ok(Self(pitch))
        } else {
            Err(SnapError::InvalidPitch { pitch })
        }
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ItemPitch {
    type Error = SnapError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rounding {
    #[default]
    HalfAwayFromZero,
    HalfEven,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::HalfAwayFromZero => value.round(),
            Rounding::HalfEven => value.round_ties_even(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCalculator {
    pub fling_factor: f64,
    pub rounding: Rounding,
}

impl Default for SnapCalculator {
    fn default() -> Self {
        Self {
            fling_factor: DEFAULT_FLING_FACTOR,
            rounding: Rounding::default(),
        }
    }
}

impl SnapCalculator {
    #[must_use]
    pub fn new(fling_factor: f64, rounding: Rounding) -> Self {
        Self {
            fling_factor,
            rounding,
        }
    }

    // non-finite projections collapse to 0
    #[must_use]
    pub fn projected_index(&self, current_offset: f64, velocity: f64, pitch: ItemPitch) -> i64 {
        let projected = current_offset + velocity * self.fling_factor;
        let raw = self.rounding.apply(projected / pitch.get());
        if raw.is_nan() { 0 } else { raw as i64 }
    }

    #[must_use]
    pub fn drag_end_offset(&self, current_offset: f64, velocity: f64, pitch: ItemPitch) -> f64 {
        let index = self.projected_index(current_offset, velocity, pitch);
        tracing::trace!(current_offset, velocity, index, "drag end snap");
        index as f64 * pitch.get()
    }

    pub fn settled_offset(
        &self,
        current_offset: f64,
        velocity: f64,
        pitch: ItemPitch,
        max_index: i64,
    ) -> Result<f64, SnapError> {
        if max_index < 0 {
            return Err(SnapError::InvalidRange { max_index });
        }

        let index = self
            .projected_index(current_offset, velocity, pitch)
            .clamp(0, max_index);
        tracing::trace!(current_offset, velocity, index, max_index, "settled snap");
        Ok(index as f64 * pitch.get())
    }
}

#[must_use]
pub fn compute_drag_end_offset(current_offset: f64, velocity: f64, item_pitch: ItemPitch) -> f64 {
    SnapCalculator::default().drag_end_offset(current_offset, velocity, item_pitch)
}

pub fn compute_settled_offset(
    current_offset: f64,
    velocity: f64,
    item_pitch: ItemPitch,
    max_index: i64,
) -> Result<f64, SnapError> {
    SnapCalculator::default().settled_offset(current_offset, velocity, item_pitch, max_index)
}
