/// Notifications sent to the event sink, each with a boolean payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Display direction changed; payload is the new `desc` flag.
    Desc,
    /// A fetch started (`true`) or resolved (`false`).
    Loading,
    /// The list became visible or hidden.
    Visible,
}

/// What the outstanding fetch, if any, was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchType {
    #[default]
    None,
    Newer,
    Older,
    Update,
}
