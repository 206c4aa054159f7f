pub mod driver;
pub mod orchestrator;


use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

pub use driver::SourceDriver;
pub use orchestrator::HarvestOrchestrator;

/// Fixed contact-related terms appended to the caller's query to widen
/// recall.
pub const QUERY_EXPANSION_TERMS: [&str; 10] = [
    "contact email",
    "email address",
    "contact us",
    "get in touch",
    "reach us",
    "contact information",
    "email us",
    "contact details",
    "business email",
    "office email",
];

pub fn expand_query(query: &str) -> Vec<String> {
    QUERY_EXPANSION_TERMS
        .iter()
        .map(|term| format!("{} {}", query, term))
        .collect()
}

/// The run's accumulating email set. Only the orchestrator's merge step
/// writes to it; everything upstream returns fresh sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    emails: HashSet<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set union; commutative and idempotent, so merge order across
    /// providers and pages never changes the final set.
    pub fn merge(&mut self, page_emails: HashSet<String>) {
        self.emails.extend(page_emails);
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.emails.iter()
    }

    pub fn sorted(&self) -> Vec<String> {
        let mut emails: Vec<String> = self.emails.iter().cloned().collect();
        emails.sort();
        emails
    }
}

/// Stops a running harvest at the next page/link boundary.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelSignal { rx })
}
