use crate::snap::{ItemPitch, SnapCalculator, SnapError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub card_height: f64,
    pub card_spacing: f64,
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self {
            card_height: 220.0,
            card_spacing: 35.0,
        }
    }
}

impl CardGeometry {
    pub fn pitch(&self) -> Result<ItemPitch, SnapError> {
        ItemPitch::new(self.card_height + self.card_spacing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    #[default]
    Idle,
    Dragging,
    Settling,
}

#[derive(Debug, Clone)]
pub struct CarouselTracker {
    pitch: ItemPitch,
    item_count: usize,
    calculator: SnapCalculator,
    phase: ScrollPhase,
    release_velocity: f64,
}

impl CarouselTracker {
    pub fn new(
        geometry: CardGeometry,
        item_count: usize,
        calculator: SnapCalculator,
    ) -> Result<Self, SnapError> {
        Ok(Self {
            pitch: geometry.pitch()?,
            item_count,
            calculator,
            phase: ScrollPhase::Idle,
            release_velocity: 0.0,
        })
    }

    #[must_use]
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    #[must_use]
    pub fn release_velocity(&self) -> f64 {
        self.release_velocity
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
    }

    pub fn begin_drag(&mut self) {
        self.phase = ScrollPhase::Dragging;
    }

    // No live proposal while a previous fling is still decelerating; the
    // velocity is recorded either way.
    pub fn end_drag(
        &mut self,
        current_offset: f64,
        velocity: f64,
        is_decelerating: bool,
    ) -> Option<f64> {
        self.release_velocity = velocity;
        self.phase = ScrollPhase::Settling;
        if is_decelerating {
            tracing::debug!(velocity, "carousel drag ended while decelerating");
            return None;
        }
        let target = self
            .calculator
            .drag_end_offset(current_offset, velocity, self.pitch);
        tracing::debug!(current_offset, velocity, target, "carousel drag ended");
        Some(target)
    }

    pub fn begin_deceleration(&mut self, current_offset: f64) -> Result<f64, SnapError> {
        let max_index = self.item_count as i64 - 1;
        let settled = self.calculator.settled_offset(
            current_offset,
            self.release_velocity,
            self.pitch,
            max_index,
        );
        self.phase = ScrollPhase::Idle;
        match &settled {
            Ok(target) => {
                tracing::debug!(current_offset, target, max_index, "carousel settled")
            }
            Err(err) => tracing::warn!(error = %err, "carousel has nothing to settle on"),
        }
        settled
    }
}

#[must_use]
pub fn trailing_padding(viewport_height: f64, card_height: f64, vertical_padding: f64) -> f64 {
    (viewport_height - card_height - 2.0 * vertical_padding).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(count: usize) -> CarouselTracker {
        CarouselTracker::new(CardGeometry::default(), count, SnapCalculator::default())
            .expect("tracker")
    }

    #[test]
    fn pitch_includes_spacing() {
        let pitch = CardGeometry::default().pitch().expect("pitch");
        assert_eq!(pitch.get(), 255.0);
    }

    #[test]
    fn phases_follow_the_gesture() {
        let mut carousel = tracker(5);
        assert_eq!(carousel.phase(), ScrollPhase::Idle);
        carousel.begin_drag();
        assert_eq!(carousel.phase(), ScrollPhase::Dragging);
        carousel.end_drag(0.0, 0.0, false);
        assert_eq!(carousel.phase(), ScrollPhase::Settling);
        carousel.begin_deceleration(0.0).expect("settle");
        assert_eq!(carousel.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn deceleration_reuses_release_velocity() {
        let mut carousel = tracker(5);
        carousel.begin_drag();
        // 300 + 4 * 60 = 540 -> index 2.
        let proposal = carousel.end_drag(300.0, 4.0, false);
        assert_eq!(proposal, Some(510.0));
        assert_eq!(carousel.release_velocity(), 4.0);

        // Surface has moved on a bit; velocity still comes from the release.
        let settled = carousel.begin_deceleration(400.0).expect("settle");
        // 400 + 240 = 640 -> 2.51 -> index 3.
        assert_eq!(settled, 765.0);
    }

    #[test]
    fn deceleration_clamps_to_item_count() {
        let mut carousel = tracker(5);
        carousel.begin_drag();
        let proposal = carousel
            .end_drag(1000.0, 50.0, false)
            .expect("proposal");
        assert!(proposal > 4.0 * 255.0);
        assert_eq!(carousel.begin_deceleration(1000.0).expect("settle"), 1020.0);

        carousel.set_item_count(2);
        carousel.begin_drag();
        carousel.end_drag(1000.0, 50.0, false);
        assert_eq!(carousel.begin_deceleration(1000.0).expect("settle"), 255.0);
    }

    #[test]
    fn drag_ending_mid_deceleration_proposes_nothing() {
        let mut carousel = tracker(5);
        carousel.begin_drag();
        assert_eq!(carousel.end_drag(300.0, 4.0, true), None);
        assert_eq!(carousel.phase(), ScrollPhase::Settling);
        assert_eq!(carousel.release_velocity(), 4.0);

        // The recorded velocity still drives the settle.
        assert_eq!(carousel.begin_deceleration(400.0).expect("settle"), 765.0);
    }

    #[test]
    fn empty_carousel_cannot_settle() {
        let mut carousel = tracker(0);
        carousel.begin_drag();
        carousel.end_drag(10.0, 1.0, false);
        assert_eq!(
            carousel.begin_deceleration(10.0),
            Err(SnapError::InvalidRange { max_index: -1 })
        );
        assert_eq!(carousel.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn bad_geometry_is_rejected() {
        let geometry = CardGeometry {
            card_height: 0.0,
            card_spacing: 0.0,
        };
        assert!(CarouselTracker::new(geometry, 3, SnapCalculator::default()).is_err());
    }

    #[test]
    fn trailing_padding_lets_last_card_reach_top() {
        assert_eq!(trailing_padding(800.0, 220.0, 20.0), 540.0);
        assert_eq!(trailing_padding(100.0, 220.0, 20.0), 0.0);
    }
}
