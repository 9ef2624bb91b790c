//
//  harbor-client
//  api/testing.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Recording [`Transport`] double for subclient tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{Method, Operation, Response, Transport, TransportError};

type Handler = dyn Fn(&Operation) -> Result<Response, TransportError> + Send + Sync;

/// Answers every operation through a closure and keeps a log of what was
/// submitted.
pub(crate) struct FakeTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<Operation>>,
}

impl FakeTransport {
    pub(crate) fn new(
        handler: impl Fn(&Operation) -> Result<Response, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// A transport for tests that expect no network traffic at all.
    pub(crate) fn offline() -> Arc<Self> {
        Self::new(|op| Err(TransportError::from_status(599, format!("unexpected call {op}"))))
    }

    pub(crate) fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    /// `"METHOD /path"` for every submitted operation.
    pub(crate) fn log(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of PUT, POST and DELETE calls.
    pub(crate) fn mutations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|op| op.method != Method::Get)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn submit(&self, operation: Operation) -> Result<Response, TransportError> {
        let result = (self.handler)(&operation);
        self.calls.lock().unwrap().push(operation);
        result
    }
}

pub(crate) fn json(status: u16, body: Value) -> Result<Response, TransportError> {
    Ok(Response::new(status, Some(body)))
}

pub(crate) fn empty(status: u16) -> Result<Response, TransportError> {
    Ok(Response::new(status, None))
}

pub(crate) fn status(code: u16) -> Result<Response, TransportError> {
    Err(TransportError::from_status(code, "fake"))
}
