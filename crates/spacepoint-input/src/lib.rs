pub mod calibration;
pub mod pointer;

/// One of the device's two buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// A press or release of one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    pub button: MouseButton,
    pub pressed: bool,
}

/// Describes how the pointer should move this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMotion {
    /// Relative move in screen pixels, +y down.
    Move { dx: i32, dy: i32 },
    /// Move to a screen position.
    MoveAbsolute { x: i32, y: i32 },
}

/// Everything the host pointer should do for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerIntent {
    pub motion: Option<PointerMotion>,
    pub buttons: Vec<ButtonEdge>,
}

impl PointerIntent {
    /// Nothing to send to the host.
    pub fn is_idle(&self) -> bool {
        let still = match self.motion {
            None | Some(PointerMotion::Move { dx: 0, dy: 0 }) => true,
            Some(_) => false,
        };
        still && self.buttons.is_empty()
    }
}

/// The host's pointer-move and button primitives.
pub trait PointerSink {
    fn apply(&mut self, intent: &PointerIntent) -> std::io::Result<()>;
}

impl<S: PointerSink + ?Sized> PointerSink for Box<S> {
    fn apply(&mut self, intent: &PointerIntent) -> std::io::Result<()> {
        (**self).apply(intent)
    }
}
