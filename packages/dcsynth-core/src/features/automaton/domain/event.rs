/*
 * Event
 *
 * Per-controller observability and controllability flags; index i of each
 * vector belongs to controller i + 1 of a U-Structure label.
 */

use crate::features::label_vector::LabelVector;
use crate::shared::models::EventId;
use serde::{Deserialize, Serialize};

/// Event of an automaton, immutable once registered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub label: String,
    pub observable: Vec<bool>,
    pub controllable: Vec<bool>,
}

impl Event {
    pub fn new(
        id: EventId,
        label: impl Into<String>,
        observable: Vec<bool>,
        controllable: Vec<bool>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            observable,
            controllable,
        }
    }

    pub fn is_observable_by(&self, controller: usize) -> bool {
        self.observable.get(controller).copied().unwrap_or(false)
    }

    pub fn is_controllable_by(&self, controller: usize) -> bool {
        self.controllable.get(controller).copied().unwrap_or(false)
    }

    /// Controllable by at least one controller
    pub fn is_controllable(&self) -> bool {
        self.controllable.iter().any(|c| *c)
    }

    /// Controllers (0-based) that control this event
    pub fn controllers(&self) -> impl Iterator<Item = usize> + '_ {
        self.controllable
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(i, _)| i)
    }

    /// Same observability/controllability vectors
    pub fn same_flags(&self, observable: &[bool], controllable: &[bool]) -> bool {
        self.observable == observable && self.controllable == controllable
    }

    /// Label parsed as a vector (plain labels are length 1)
    pub fn vector(&self) -> Option<LabelVector> {
        LabelVector::try_parse(&self.label)
    }
}

/// Outcome of registering an event label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAdded {
    New(EventId),
    /// Label was already present with identical flags
    Existing(EventId),
}

impl EventAdded {
    pub fn id(self) -> EventId {
        match self {
            Self::New(id) | Self::Existing(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Self::New(_))
    }
}
