use spacepoint_config::ScreenConfig;
use spacepoint_input::{PointerIntent, PointerMotion, PointerSink};
use tracing::{debug, info};

/// Pick the best available host pointer. Falls back to logging when no
/// virtual input device can be created.
#[cfg_attr(not(target_os = "linux"), allow(unused_variables))]
pub fn host_sink(screen: ScreenConfig) -> Box<dyn PointerSink> {
    #[cfg(target_os = "linux")]
    {
        match uinput::UinputSink::new(screen) {
            Ok(sink) => {
                info!("Created virtual pointer device");
                return Box::new(sink);
            }
            Err(e) => {
                tracing::warn!(?e, "Could not create uinput device (is /dev/uinput writable?)");
            }
        }
    }

    info!("Pointer output disabled, logging intents instead");
    Box::new(LogSink)
}

/// Logs intents instead of moving anything.
pub struct LogSink;

impl PointerSink for LogSink {
    fn apply(&mut self, intent: &PointerIntent) -> std::io::Result<()> {
        debug!(?intent, "Pointer intent");
        Ok(())
    }
}

/// Tracks where the pointer should be, so absolute targets can be sent
/// to a relative-only device.
///
/// The estimate drifts if the host accelerates relative motion or the
/// pointer is moved by another device. Pushing against a screen edge
/// brings that axis back in sync.
#[derive(Debug, Clone, Copy)]
pub struct CursorTracker {
    position: (i32, i32),
    max: (i32, i32),
}

impl CursorTracker {
    /// Start at screen center.
    pub fn new(screen: ScreenConfig) -> Self {
        Self {
            position: screen.center(),
            max: (
                screen.width.saturating_sub(1) as i32,
                screen.height.saturating_sub(1) as i32,
            ),
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Relative step for `motion`, updating the tracked position.
    pub fn step(&mut self, motion: PointerMotion) -> (i32, i32) {
        let (x, y) = self.position;
        let (dx, dy) = match motion {
            PointerMotion::Move { dx, dy } => (dx, dy),
            PointerMotion::MoveAbsolute { x: tx, y: ty } => (tx - x, ty - y),
        };
        self.position = (
            x.saturating_add(dx).clamp(0, self.max.0),
            y.saturating_add(dy).clamp(0, self.max.1),
        );
        (dx, dy)
    }
}

#[cfg(target_os = "linux")]
mod uinput {
    use super::CursorTracker;
    use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
    use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};
    use spacepoint_config::ScreenConfig;
    use spacepoint_input::{MouseButton, PointerIntent, PointerSink};

    /// Virtual relative mouse on `/dev/uinput`.
    pub struct UinputSink {
        device: VirtualDevice,
        cursor: CursorTracker,
    }

    impl UinputSink {
        pub fn new(screen: ScreenConfig) -> std::io::Result<Self> {
            let mut keys = AttributeSet::<Key>::new();
            keys.insert(Key::BTN_LEFT);
            keys.insert(Key::BTN_RIGHT);

            let device = VirtualDeviceBuilder::new()?
                .name("SpacePoint Fusion pointer")
                .with_keys(&keys)?
                .with_relative_axes(&AttributeSet::from_iter([
                    RelativeAxisType::REL_X,
                    RelativeAxisType::REL_Y,
                    RelativeAxisType::REL_WHEEL, // convinces libinput it's a mouse
                ]))?
                .build()?;

            Ok(Self {
                device,
                cursor: CursorTracker::new(screen),
            })
        }
    }

    impl PointerSink for UinputSink {
        fn apply(&mut self, intent: &PointerIntent) -> std::io::Result<()> {
            let mut events = Vec::with_capacity(4);

            if let Some(motion) = intent.motion {
                let (dx, dy) = self.cursor.step(motion);
                if dx != 0 {
                    events.push(InputEvent::new(
                        EventType::RELATIVE,
                        RelativeAxisType::REL_X.0,
                        dx,
                    ));
                }
                if dy != 0 {
                    events.push(InputEvent::new(
                        EventType::RELATIVE,
                        RelativeAxisType::REL_Y.0,
                        dy,
                    ));
                }
            }

            for edge in &intent.buttons {
                let key = match edge.button {
                    MouseButton::Left => Key::BTN_LEFT,
                    MouseButton::Right => Key::BTN_RIGHT,
                };
                events.push(InputEvent::new(
                    EventType::KEY,
                    key.code(),
                    i32::from(edge.pressed),
                ));
            }

            if events.is_empty() {
                return Ok(());
            }
            // emit() appends the SYN_REPORT.
            self.device.emit(&events)
        }
    }
}
