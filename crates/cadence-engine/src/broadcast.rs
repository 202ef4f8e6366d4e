//! Broadcasters shipped with the engine.

use cadence_core::{Audience, Broadcaster, StyledText};
use tracing::info;

/// Writes every message to the `tracing` log at info level.
///
/// Useful for headless hosts where there is no chat to broadcast to.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingBroadcaster;

impl Broadcaster for TracingBroadcaster {
    fn broadcast(&mut self, message: &StyledText, audience: Audience) {
        info!(?audience, "{}", message);
    }
}

/// Discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn broadcast(&mut self, _message: &StyledText, _audience: Audience) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcasters_accept_messages_without_subscriber() {
        let text = StyledText::from("Warp finished");
        TracingBroadcaster.broadcast(&text, Audience::All);
        NullBroadcaster.broadcast(&text, Audience::Operators);
    }
}
