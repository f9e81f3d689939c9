use glam::Vec2;

/// A pointer event on the output surface, in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed at the given position.
    Down(Vec2),
    /// Pointer moved to the given position.
    Move(Vec2),
    /// Primary button released.
    Up,
    /// Pointer left the surface.
    Leave,
    /// Wheel scrolled; positive is away from the user.
    Wheel(f32),
}

impl PointerEvent {
    pub fn position(&self) -> Option<Vec2> {
        match self {
            PointerEvent::Down(p) | PointerEvent::Move(p) => Some(*p),
            _ => None,
        }
    }
}
