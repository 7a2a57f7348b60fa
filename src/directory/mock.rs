//! # Mock Directory
//!
//! Scripted [`Directory`] for orchestrator tests. Each expected call is queued with the
//! outcome it should produce; calls are answered strictly in order and recorded, so a test
//! can assert both the result and exactly which remote calls were issued.
//!
//! ```rust,ignore
//! let directory = Arc::new(MockDirectory::new());
//! directory.expect_lookup(Service::User, 1).returns(LookupOutcome::NotFound);
//!
//! let orchestrator = OrderOrchestrator::new(directory.clone(), RetryPolicy::default());
//! // ... drive the orchestrator ...
//! directory.verify();
//! ```

use super::{Directory, LookupOutcome, MutateOutcome, Service};
use crate::wire::FlatObject;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A call the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryCall {
    Lookup {
        service: Service,
        id: i64,
    },
    Mutate {
        service: Service,
        id: i64,
        command: String,
        payload: FlatObject,
    },
}

enum Expectation {
    Lookup {
        service: Service,
        id: i64,
        outcome: LookupOutcome,
    },
    Mutate {
        service: Service,
        id: i64,
        outcome: MutateOutcome,
    },
}

#[derive(Default)]
pub struct MockDirectory {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `lookup` of `id` on `service`.
    pub fn expect_lookup(&self, service: Service, id: i64) -> LookupExpectationBuilder {
        LookupExpectationBuilder {
            service,
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `mutate` of `id` on `service`.
    pub fn expect_mutate(&self, service: Service, id: i64) -> MutateExpectationBuilder {
        MutateExpectationBuilder {
            service,
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `mutate` calls received so far.
    pub fn mutate_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, DirectoryCall::Mutate { .. }))
            .count()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next(&self, call: DirectoryCall) -> Option<Expectation> {
        self.calls.lock().unwrap().push(call);
        self.expectations.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn lookup(&self, service: Service, id: i64) -> LookupOutcome {
        match self.next(DirectoryCall::Lookup { service, id }) {
            Some(Expectation::Lookup {
                service: s,
                id: i,
                outcome,
            }) if s == service && i == id => outcome,
            _ => panic!("Unexpected lookup of {service}/{id}"),
        }
    }

    async fn mutate(
        &self,
        service: Service,
        id: i64,
        command: &str,
        payload: FlatObject,
    ) -> MutateOutcome {
        let call = DirectoryCall::Mutate {
            service,
            id,
            command: command.to_string(),
            payload,
        };
        match self.next(call) {
            Some(Expectation::Mutate {
                service: s,
                id: i,
                outcome,
            }) if s == service && i == id => outcome,
            _ => panic!("Unexpected {command} on {service}/{id}"),
        }
    }
}

/// Builder for `lookup` expectations.
pub struct LookupExpectationBuilder {
    service: Service,
    id: i64,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl LookupExpectationBuilder {
    pub fn returns(self, outcome: LookupOutcome) {
        self.expectations
            .lock()
            .unwrap()
            .push_back(Expectation::Lookup {
                service: self.service,
                id: self.id,
                outcome,
            });
    }
}

/// Builder for `mutate` expectations.
pub struct MutateExpectationBuilder {
    service: Service,
    id: i64,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl MutateExpectationBuilder {
    pub fn returns(self, outcome: MutateOutcome) {
        self.expectations
            .lock()
            .unwrap()
            .push_back(Expectation::Mutate {
                service: self.service,
                id: self.id,
                outcome,
            });
    }
}
