use super::types::DebouncedEvents;
use crate::actor::messages::BuildMsg;

pub(super) fn log_events(events: &DebouncedEvents) {
    for (path, kind) in &events.changes {
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
    }
}

/// Every actionable change rebuilds the whole output.
pub(super) fn events_to_message(events: DebouncedEvents) -> BuildMsg {
    BuildMsg::Rebuild {
        changed: events.paths().cloned().collect(),
        config_changed: events.config_changed,
    }
}
