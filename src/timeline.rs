//! Lifecycle history reconstructed from the flat `timeline` object the
//! server returns for clients, groups and loans.
use super::error::Result;
use super::json::Fields;
use chrono::NaiveDate;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submitted,
    Activated,
    Approved,
    Withdrawn,
    Closed,
    Rejected,
    WrittenOff,
    Disbursed,
}

impl EventKind {
    /// Scan order used when reconstructing a timeline.
    pub const ALL: [EventKind; 8] = [
        EventKind::Submitted,
        EventKind::Activated,
        EventKind::Approved,
        EventKind::Withdrawn,
        EventKind::Closed,
        EventKind::Rejected,
        EventKind::WrittenOff,
        EventKind::Disbursed,
    ];

    fn prefix(self) -> &'static str {
        match self {
            EventKind::Submitted => "submitted",
            EventKind::Activated => "activated",
            EventKind::Approved => "approved",
            EventKind::Withdrawn => "withdrawn",
            EventKind::Closed => "closed",
            EventKind::Rejected => "rejected",
            EventKind::WrittenOff => "writtenOff",
            EventKind::Disbursed => "disbursed",
        }
    }

    pub fn date_key(self) -> String {
        match self {
            EventKind::Disbursed => "actualDisbursementDate".to_owned(),
            other => format!("{}OnDate", other.prefix()),
        }
    }

    pub fn username_key(self) -> String {
        format!("{}ByUsername", self.prefix())
    }

    pub fn firstname_key(self) -> String {
        format!("{}ByFirstname", self.prefix())
    }

    pub fn lastname_key(self) -> String {
        format!("{}ByLastname", self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub date: Option<NaiveDate>,
    pub actor_username: Option<String>,
    pub actor_first_name: Option<String>,
    pub actor_last_name: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            date: None,
            actor_username: None,
            actor_first_name: None,
            actor_last_name: None,
        }
    }
}

/// At most one event per kind, in scan order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    pub fn from_json(value: &Value) -> Result<Self> {
        let fields = Fields::new(value)?;
        let mut events = Vec::new();

        for kind in EventKind::ALL {
            // index of this phase's event once the first key for it matched
            let mut slot: Option<usize> = None;
            let mut event_for = |events: &mut Vec<Event>| -> usize {
                *slot.get_or_insert_with(|| {
                    events.push(Event::new(kind));
                    events.len() - 1
                })
            };

            if let Some(date) = fields.date(&kind.date_key(), None)? {
                let i = event_for(&mut events);
                events[i].date = Some(date);
            }
            if let Some(username) = fields.str(&kind.username_key()) {
                let i = event_for(&mut events);
                events[i].actor_username = Some(username);
            }
            if let Some(first) = fields.str(&kind.firstname_key()) {
                let i = event_for(&mut events);
                events[i].actor_first_name = Some(first);
            }
            if let Some(last) = fields.str(&kind.lastname_key()) {
                let i = event_for(&mut events);
                events[i].actor_last_name = Some(last);
            }
        }

        tracing::debug!(events = events.len(), "reconstructed timeline");
        Ok(Self { events })
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, kind: EventKind) -> Option<&Event> {
        self.events.iter().find(|e| e.kind == kind)
    }

    pub fn date_of(&self, kind: EventKind) -> Option<NaiveDate> {
        self.get(kind).and_then(|e| e.date)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
