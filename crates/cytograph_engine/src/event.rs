//! Change notifications emitted by `GraphStore` after each logical mutation.

use crate::types::ElementId;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
    NodesAdded(Vec<ElementId>),
    NodesRemoved(Vec<ElementId>),
    EdgesAdded { count: usize },
    EdgesRemoved { count: usize },
    NodeChanged(ElementId),
    Cleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GraphEvent) + Send>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(lid, _)| *lid != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        if self.entries.is_empty() {
            return;
        }
        tracing::trace!(?event, listeners = self.entries.len(), "dispatching graph event");
        for (_, listener) in self.entries.iter_mut() {
            listener(&event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("count", &self.entries.len()).finish()
    }
}
