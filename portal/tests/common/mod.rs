//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use portal::{Client, ClientConfig, RawResponse, RequestDescriptor, Transport, TransportError};

/// Records every descriptor it is handed and answers with a canned response.
#[derive(Debug)]
pub struct SpyTransport {
    calls: Mutex<Vec<RequestDescriptor>>,
    response: RawResponse,
}

impl SpyTransport {
    pub fn new(response: RawResponse) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response,
        }
    }

    pub fn ok() -> Self {
        Self::new(RawResponse::new(200).with_json(&serde_json::json!({ "acknowledged": true })))
    }

    pub fn calls(&self) -> Vec<RequestDescriptor> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last(&self) -> RequestDescriptor {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("transport was never called")
    }
}

#[async_trait]
impl Transport for SpyTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

/// A client over a shared spy, so the test can inspect what was sent.
pub fn spy_client(spy: std::sync::Arc<SpyTransport>, config: ClientConfig) -> Client {
    Client::with_shared_transport(spy, config)
}

pub fn local_config() -> ClientConfig {
    ClientConfig::new("http://localhost:9200").unwrap()
}
