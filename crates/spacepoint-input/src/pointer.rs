use crate::calibration::CalibrationOffset;
use crate::{ButtonEdge, MouseButton, PointerIntent, PointerMotion};
use spacepoint_config::{MappingMode, PointerConfig, ScreenConfig};
use spacepoint_imu::types::{Buttons, Orientation};

/// Last seen state of each button, used to turn levels into edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonLatch {
    pub left_down: bool,
    pub right_down: bool,
}

impl ButtonLatch {
    /// Record the new levels and return the press/release edges.
    pub fn update(&mut self, buttons: Buttons) -> Vec<ButtonEdge> {
        let mut edges = Vec::new();
        for (button, down, latched) in [
            (MouseButton::Left, buttons.left, &mut self.left_down),
            (MouseButton::Right, buttons.right, &mut self.right_down),
        ] {
            if down != *latched {
                *latched = down;
                edges.push(ButtonEdge {
                    button,
                    pressed: down,
                });
            }
        }
        edges
    }
}

/// Turns orientation and button levels into pointer intents.
///
/// Holds the previous orientation (for delta mode) and the button latch,
/// so each [`tick`](PointerMapper::tick) only needs the latest snapshot.
pub struct PointerMapper {
    config: PointerConfig,
    screen: ScreenConfig,
    prev: Option<Orientation>,
    latch: ButtonLatch,
}

impl PointerMapper {
    pub fn new(config: PointerConfig, screen: ScreenConfig) -> Self {
        Self {
            config,
            screen,
            prev: None,
            latch: ButtonLatch::default(),
        }
    }

    pub fn mode(&self) -> MappingMode {
        self.config.mode
    }

    pub fn prev_orientation(&self) -> Option<Orientation> {
        self.prev
    }

    pub fn latch(&self) -> ButtonLatch {
        self.latch
    }

    /// Make `orientation` the previous sample, so the next delta starts from it.
    pub fn reseed(&mut self, orientation: Orientation) {
        self.prev = Some(orientation);
    }

    /// Compute this tick's intent.
    ///
    /// `None` inputs mean that channel has not reported yet: no motion
    /// without an orientation, latch untouched without buttons. Holding
    /// both buttons centers the pointer, overriding any computed motion.
    pub fn tick(
        &mut self,
        orientation: Option<Orientation>,
        buttons: Option<Buttons>,
        calibration: CalibrationOffset,
    ) -> PointerIntent {
        let mut intent = PointerIntent::default();

        if let Some(current) = orientation {
            intent.motion = match self.config.mode {
                MappingMode::Delta => self.delta_motion(current),
                MappingMode::Absolute => Some(self.absolute_motion(current, calibration)),
            };
            self.prev = Some(current);
        }

        if let Some(buttons) = buttons {
            intent.buttons = self.latch.update(buttons);
            if buttons.chord() {
                let (x, y) = self.screen.center();
                intent.motion = Some(PointerMotion::MoveAbsolute { x, y });
            }
        }

        intent
    }

    fn delta_motion(&self, current: Orientation) -> Option<PointerMotion> {
        // First sample only seeds the history.
        let prev = self.prev?;

        let dyaw = current.yaw - prev.yaw;
        let dpitch = current.pitch - prev.pitch;

        let magnitude = dyaw.abs();
        let dx = if magnitude >= self.config.wrap_threshold_deg
            || magnitude <= self.config.dead_zone_deg
        {
            0
        } else {
            round_px(self.config.gain_x * dyaw)
        };
        // Pitching up moves the pointer up, and screen y grows downward.
        let dy = -round_px(self.config.gain_y * dpitch);

        Some(PointerMotion::Move { dx, dy })
    }

    fn absolute_motion(&self, current: Orientation, calibration: CalibrationOffset) -> PointerMotion {
        let dyaw = wrap_degrees(current.yaw - calibration.yaw0);
        let dpitch = current.pitch - calibration.pitch0;

        let (cx, cy) = self.screen.center();
        let max_x = self.screen.width.saturating_sub(1) as i32;
        let max_y = self.screen.height.saturating_sub(1) as i32;

        PointerMotion::MoveAbsolute {
            x: (cx + round_px(self.config.gain_x * dyaw)).clamp(0, max_x),
            y: (cy - round_px(self.config.gain_y * dpitch)).clamp(0, max_y),
        }
    }
}

/// Pixel count for a scaled angle. Saturates on overflow.
fn round_px(value: f64) -> i32 {
    value.round() as i32
}

/// Map an angle difference into [-180, 180).
fn wrap_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_BUTTONS: Buttons = Buttons {
        left: false,
        right: false,
    };

    fn orientation(yaw: f64, pitch: f64) -> Orientation {
        Orientation {
            yaw,
            pitch,
            roll: 0.0,
        }
    }

    fn delta_mapper() -> PointerMapper {
        PointerMapper::new(PointerConfig::default(), ScreenConfig::default())
    }

    fn absolute_mapper() -> PointerMapper {
        let config = PointerConfig {
            mode: MappingMode::Absolute,
            ..PointerConfig::default()
        };
        PointerMapper::new(config, ScreenConfig::default())
    }

    /// Seed at `from`, then tick to `to` and return the motion.
    fn step(mapper: &mut PointerMapper, from: Orientation, to: Orientation) -> Option<PointerMotion> {
        let calibration = CalibrationOffset::default();
        mapper.tick(Some(from), None, calibration);
        mapper.tick(Some(to), None, calibration).motion
    }

    #[test]
    fn first_sample_seeds_without_motion() {
        let mut mapper = delta_mapper();
        let intent = mapper.tick(Some(orientation(10.0, 5.0)), None, CalibrationOffset::default());
        assert_eq!(intent.motion, None);
        assert_eq!(mapper.prev_orientation(), Some(orientation(10.0, 5.0)));
    }

    #[test]
    fn no_orientation_no_motion() {
        let mut mapper = delta_mapper();
        let intent = mapper.tick(None, Some(NO_BUTTONS), CalibrationOffset::default());
        assert!(intent.is_idle());
        assert_eq!(mapper.prev_orientation(), None);
    }

    #[test]
    fn dead_zone_suppresses_small_yaw() {
        let mut mapper = delta_mapper();
        let motion = step(&mut mapper, orientation(0.0, 0.0), orientation(0.3, 0.0));
        assert_eq!(motion, Some(PointerMotion::Move { dx: 0, dy: 0 }));

        // Exactly at the threshold is still inside.
        let motion = step(&mut mapper, orientation(0.0, 0.0), orientation(0.4, 0.0));
        assert_eq!(motion, Some(PointerMotion::Move { dx: 0, dy: 0 }));
    }

    #[test]
    fn yaw_outside_dead_zone_moves_with_sign() {
        let mut mapper = delta_mapper();
        let motion = step(&mut mapper, orientation(0.0, 0.0), orientation(1.0, 0.0));
        assert_eq!(motion, Some(PointerMotion::Move { dx: 25, dy: 0 }));

        let motion = step(&mut mapper, orientation(0.0, 0.0), orientation(-1.0, 0.0));
        assert_eq!(motion, Some(PointerMotion::Move { dx: -25, dy: 0 }));
    }

    #[test]
    fn wrap_guard_suppresses_jump() {
        let mut mapper = delta_mapper();
        // 150 -> -150 computes as -300 rather than the true +60.
        let motion = step(&mut mapper, orientation(150.0, 0.0), orientation(-150.0, 0.0));
        assert_eq!(motion, Some(PointerMotion::Move { dx: 0, dy: 0 }));

        let motion = step(&mut mapper, orientation(-170.0, 0.0), orientation(130.0, 0.0));
        assert_eq!(motion, Some(PointerMotion::Move { dx: 0, dy: 0 }));
    }

    #[test]
    fn pitch_has_no_dead_zone_and_inverts() {
        let mut mapper = delta_mapper();
        let motion = step(&mut mapper, orientation(0.0, 0.0), orientation(0.0, 0.1));
        assert_eq!(motion, Some(PointerMotion::Move { dx: 0, dy: -2 }));

        let motion = step(&mut mapper, orientation(0.0, 0.0), orientation(0.0, -1.0));
        assert_eq!(motion, Some(PointerMotion::Move { dx: 0, dy: 20 }));
    }

    #[test]
    fn deltas_are_between_consecutive_samples() {
        let mut mapper = delta_mapper();
        let calibration = CalibrationOffset::default();
        mapper.tick(Some(orientation(0.0, 0.0)), None, calibration);

        let a = mapper.tick(Some(orientation(2.0, 0.0)), None, calibration);
        let b = mapper.tick(Some(orientation(4.0, 0.0)), None, calibration);
        let c = mapper.tick(Some(orientation(4.0, 0.0)), None, calibration);

        assert_eq!(a.motion, Some(PointerMotion::Move { dx: 50, dy: 0 }));
        assert_eq!(b.motion, Some(PointerMotion::Move { dx: 50, dy: 0 }));
        assert_eq!(c.motion, Some(PointerMotion::Move { dx: 0, dy: 0 }));
    }

    #[test]
    fn reseed_zeroes_next_delta() {
        let mut mapper = delta_mapper();
        let calibration = CalibrationOffset::default();
        mapper.tick(Some(orientation(0.0, 0.0)), None, calibration);

        mapper.reseed(orientation(30.0, 10.0));
        let intent = mapper.tick(Some(orientation(30.0, 10.0)), None, calibration);
        assert_eq!(intent.motion, Some(PointerMotion::Move { dx: 0, dy: 0 }));
    }

    #[test]
    fn button_edges_press_then_release() {
        let mut mapper = delta_mapper();
        let calibration = CalibrationOffset::default();

        let left = Buttons {
            left: true,
            right: false,
        };
        let intent = mapper.tick(None, Some(left), calibration);
        assert_eq!(
            intent.buttons,
            vec![ButtonEdge {
                button: MouseButton::Left,
                pressed: true
            }]
        );

        // Held: no repeat.
        let intent = mapper.tick(None, Some(left), calibration);
        assert!(intent.buttons.is_empty());

        let intent = mapper.tick(None, Some(NO_BUTTONS), calibration);
        assert_eq!(
            intent.buttons,
            vec![ButtonEdge {
                button: MouseButton::Left,
                pressed: false
            }]
        );
        assert_eq!(mapper.latch(), ButtonLatch::default());
    }

    #[test]
    fn missing_buttons_keep_latch() {
        let mut mapper = delta_mapper();
        let calibration = CalibrationOffset::default();
        let right = Buttons {
            left: false,
            right: true,
        };
        mapper.tick(None, Some(right), calibration);
        let intent = mapper.tick(None, None, calibration);
        assert!(intent.buttons.is_empty());
        assert!(mapper.latch().right_down);
    }

    #[test]
    fn chord_centers_over_any_motion() {
        let mut mapper = delta_mapper();
        let calibration = CalibrationOffset::default();
        let both = Buttons {
            left: true,
            right: true,
        };

        mapper.tick(Some(orientation(0.0, 0.0)), None, calibration);
        let intent = mapper.tick(Some(orientation(20.0, -10.0)), Some(both), calibration);
        assert_eq!(
            intent.motion,
            Some(PointerMotion::MoveAbsolute { x: 960, y: 540 })
        );
        assert_eq!(intent.buttons.len(), 2);

        // Still centering while held, even before any orientation.
        let mut mapper = delta_mapper();
        let intent = mapper.tick(None, Some(both), calibration);
        assert_eq!(
            intent.motion,
            Some(PointerMotion::MoveAbsolute { x: 960, y: 540 })
        );
    }

    #[test]
    fn absolute_mode_tracks_calibration() {
        let mut mapper = absolute_mapper();
        let calibration = CalibrationOffset {
            yaw0: 10.0,
            pitch0: 5.0,
        };

        let intent = mapper.tick(Some(orientation(10.0, 5.0)), None, calibration);
        assert_eq!(
            intent.motion,
            Some(PointerMotion::MoveAbsolute { x: 960, y: 540 })
        );

        let intent = mapper.tick(Some(orientation(14.0, 7.0)), None, calibration);
        assert_eq!(
            intent.motion,
            Some(PointerMotion::MoveAbsolute { x: 1060, y: 500 })
        );
    }

    #[test]
    fn absolute_mode_wraps_and_clamps() {
        let mut mapper = absolute_mapper();
        let calibration = CalibrationOffset {
            yaw0: 179.0,
            pitch0: 0.0,
        };

        // -179 is 2 degrees right of 179, not 358 to the left.
        let intent = mapper.tick(Some(orientation(-179.0, 0.0)), None, calibration);
        assert_eq!(
            intent.motion,
            Some(PointerMotion::MoveAbsolute { x: 1010, y: 540 })
        );

        let intent = mapper.tick(Some(orientation(179.0, -80.0)), None, calibration);
        assert_eq!(
            intent.motion,
            Some(PointerMotion::MoveAbsolute { x: 960, y: 1079 })
        );
    }

    #[test]
    fn wrap_degrees_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(-358.0), 2.0);
    }
}
