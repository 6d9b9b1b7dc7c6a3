use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, StrategyType};

/// all events that can be emitted by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // loan book events
    LoanAdded {
        loan_id: LoanId,
        balance: Money,
        minimum_payment: Money,
        timestamp: DateTime<Utc>,
    },
    LoanUpdated {
        loan_id: LoanId,
        old_balance: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    LoanRemoved {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        loan_id: LoanId,
        amount: Money,
        applied_to_interest: Money,
        applied_to_principal: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    LoanPaidOff {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // plan events
    BudgetChanged {
        old_budget: Option<Money>,
        new_budget: Option<Money>,
        timestamp: DateTime<Utc>,
    },
    StrategyChanged {
        old_strategy: Option<StrategyType>,
        new_strategy: Option<StrategyType>,
        timestamp: DateTime<Utc>,
    },
    ProjectionComputed {
        strategy: Option<StrategyType>,
        total_months: u32,
        total_interest: Money,
        interest_savings: Money,
        timestamp: DateTime<Utc>,
    },
    NonConvergingLoan {
        loan_id: LoanId,
        months: u32,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// the loan an event concerns, if any
    pub fn loan_id(&self) -> Option<&LoanId> {
        match self {
            Event::LoanAdded { loan_id, .. }
            | Event::LoanUpdated { loan_id, .. }
            | Event::LoanRemoved { loan_id, .. }
            | Event::PaymentRecorded { loan_id, .. }
            | Event::LoanPaidOff { loan_id, .. }
            | Event::NonConvergingLoan { loan_id, .. } => Some(loan_id),
            Event::BudgetChanged { .. } | Event::StrategyChanged { .. } | Event::ProjectionComputed { .. } => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Event::LoanAdded { timestamp, .. }
            | Event::LoanUpdated { timestamp, .. }
            | Event::LoanRemoved { timestamp, .. }
            | Event::PaymentRecorded { timestamp, .. }
            | Event::LoanPaidOff { timestamp, .. }
            | Event::BudgetChanged { timestamp, .. }
            | Event::StrategyChanged { timestamp, .. }
            | Event::ProjectionComputed { timestamp, .. }
            | Event::NonConvergingLoan { timestamp, .. } => *timestamp,
        }
    }
}

/// callback invoked for every emitted event
pub type Listener = Box<dyn Fn(&Event) + Send + Sync>;

/// event store for collecting events during operations
///
/// Listeners see each event as it is emitted; the store keeps them until taken.
#[derive(Default)]
pub struct EventStore {
    events: Vec<Event>,
    listeners: Vec<Listener>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: Event) {
        log::debug!("event: {:?}", event);
        for listener in &self.listeners {
            listener(&event);
        }
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl fmt::Debug for EventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStore")
            .field("events", &self.events)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
