/// Keyboard shortcuts for the player

/// Seconds skipped by the arrow keys
pub const SEEK_STEP_SECS: f64 = 10.0;

/// Volume change per arrow key press
pub const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Character(char),
}

/// Whether the key press was handled (and its default action suppressed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    TogglePlay,
    Seek(f64),
    AdjustVolume(f32),
    ToggleFullscreen,
    ToggleMute,
}

pub fn command_for(key: Key) -> Option<KeyCommand> {
    match key {
        Key::Space => Some(KeyCommand::TogglePlay),
        Key::ArrowLeft => Some(KeyCommand::Seek(-SEEK_STEP_SECS)),
        Key::ArrowRight => Some(KeyCommand::Seek(SEEK_STEP_SECS)),
        Key::ArrowUp => Some(KeyCommand::AdjustVolume(VOLUME_STEP)),
        Key::ArrowDown => Some(KeyCommand::AdjustVolume(-VOLUME_STEP)),
        Key::Character(c) => match c.to_ascii_lowercase() {
            'f' => Some(KeyCommand::ToggleFullscreen),
            'm' => Some(KeyCommand::ToggleMute),
            _ => None,
        },
    }
}
