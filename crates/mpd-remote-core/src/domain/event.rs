//! Key events as delivered by the remote-control input device.

/// How a key notification was generated by the input device.
///
/// The discriminants follow the Linux input subsystem's event values:
///
/// - `Press` (value 1) – the key made initial contact; fires once per tap.
/// - `Down` (value 2) – kernel autorepeat; fires repeatedly while the key is
///   physically held, at the device repeat rate.
/// - `Up` (value 0) – the key was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Down,
    Press,
    Up,
}

/// A discrete key notification from the input device.
///
/// Ephemeral: produced by the input collaborator and consumed synchronously
/// by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// How the event was generated.
    pub kind: KeyEventKind,
    /// Numeric key code as reported by the device.
    pub code: u16,
}

impl KeyEvent {
    /// Creates a new key event.
    pub fn new(kind: KeyEventKind, code: u16) -> Self {
        Self { kind, code }
    }
}

/// Composite lookup key for the command table.
///
/// An explicit `(kind, code)` pair rather than a concatenated string, so the
/// key space cannot collide incidentally and is statically checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub kind: KeyEventKind,
    pub code: u16,
}

impl Trigger {
    /// Creates a new trigger key.
    pub fn new(kind: KeyEventKind, code: u16) -> Self {
        Self { kind, code }
    }
}

impl From<KeyEvent> for Trigger {
    fn from(event: KeyEvent) -> Self {
        Self {
            kind: event.kind,
            code: event.code,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
