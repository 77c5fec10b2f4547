//! # Mock Client
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are answered
//! from a queue of expectations instead of by a running actor. Use it to test logic
//! that sits *around* a client (a display mirror, a poller) without spawning the
//! kitchen actor.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | **State** | canned replies | real aggregate |
//! | **Error injection** | `return_err` | needs a crafted state |
//! | **Use case** | client-side logic | entity logic, full system |
//!
//! ```rust,ignore
//! let mut mock = MockClient::<Kitchen>::new();
//! mock.expect_get(venue.clone()).return_ok(Some(kitchen));
//! let client = KitchenClient::new(mock.client(), SyncHub::new(16));
//! // ... exercise code that calls client.snapshot(venue) ...
//! mock.verify();
//! ```

use crate::framework::client::ResourceClient;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking.
///
/// Requests that do not match the next expectation are answered with
/// `FrameworkError::NotFound` and reported by [`MockClient::verify`].
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    mismatches: Arc<Mutex<Vec<String>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations. Must be called inside a runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let mismatches = Arc::new(Mutex::new(Vec::new()));
        let queue = expectations.clone();
        let errors = mismatches.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().expect("mock queue poisoned").pop_front();
                let mismatch = |what: String| {
                    errors.lock().expect("mock errors poisoned").push(what.clone());
                    FrameworkError::NotFound(what)
                };

                match (request, expectation) {
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Get { id, respond_to }, _) => {
                        let _ = respond_to.send(Err(mismatch(format!("unexpected get {id}"))));
                    }
                    (ResourceRequest::Create { id, respond_to, .. }, _) => {
                        let _ = respond_to.send(Err(mismatch(format!("unexpected create {id}"))));
                    }
                    (ResourceRequest::Action { id, respond_to, .. }, _) => {
                        let _ = respond_to.send(Err(mismatch(format!("unexpected action {id}"))));
                    }
                    (ResourceRequest::List { respond_to }, _) => {
                        let _ = respond_to.send(Err(mismatch("unexpected list".into())));
                    }
                    (ResourceRequest::Update { id, respond_to, .. }, _) => {
                        let _ = respond_to.send(Err(mismatch(format!("unexpected update {id}"))));
                    }
                    (ResourceRequest::Delete { id, respond_to }, _) => {
                        let _ = respond_to.send(Err(mismatch(format!("unexpected delete {id}"))));
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            mismatches,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` for `id`.
    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| Expectation::Get {
            id,
            response,
        })
    }

    /// Expects a `create` with any id.
    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Create {
            response,
        })
    }

    /// Expects an action on `id`.
    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Action { id, response }
        })
    }

    /// Panics unless every expectation was consumed by a matching request.
    pub fn verify(&self) {
        let mismatches = self.mismatches.lock().expect("mock errors poisoned");
        if !mismatches.is_empty() {
            panic!("Unexpected requests: {:?}", *mismatches);
        }
        let remaining = self.expectations.lock().expect("mock queue poisoned").len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    build: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: Queue<T>,
        build: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> Self {
        Self {
            expectations,
            build: Box::new(build),
        }
    }

    /// Answers the expected request with `value`.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Answers the expected request with `error`.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.build)(response);
        self.expectations
            .lock()
            .expect("mock queue poisoned")
            .push_back(expectation);
    }
}

/// Creates a client plus the raw receiver, for tests that want to answer requests by hand.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}
