use super::*;

/// Pool notifications a session acts on.
#[derive(Debug, Clone)]
pub enum Event {
    Notify(Notify),
    SetDifficulty(Difficulty),
    Disconnected,
}
