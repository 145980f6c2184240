use std::cell::RefCell;

use serde_json::{Map, Value};

use crate::client::Client;
use crate::credentials::{Credential, Identity, Role};
use crate::error::Result;
use crate::query::Condition;
use crate::request::Request;
use crate::response::{Body, Envelope};
use crate::transport::Transport;

// One request as observed at the transport seam.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub(crate) base_url: String,
    pub(crate) request: Request,
    pub(crate) credentials: Vec<Credential>,
}

// A transport spy: records every dispatched request and serves canned
// responses in order, defaulting to an empty 200 once they run out.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    responses: RefCell<Vec<Envelope>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub(crate) fn with_responses(responses: Vec<Envelope>) -> Self {
        Self {
            responses: RefCell::new(responses),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for RecordingTransport {
    fn execute(
        &self,
        base_url: &str,
        request: &Request,
        credentials: &[Credential],
    ) -> Result<Envelope> {
        self.calls.borrow_mut().push(RecordedCall {
            base_url: base_url.to_owned(),
            request: request.clone(),
            credentials: credentials.to_vec(),
        });

        let mut responses = self.responses.borrow_mut();
        if responses.is_empty() {
            Ok(Envelope::new(200, Body::Absent))
        } else {
            Ok(responses.remove(0))
        }
    }
}

pub(crate) fn user_client(responses: Vec<Envelope>) -> Client<RecordingTransport> {
    Client::with_transport(
        Role::EndUser,
        Identity::new().with_system("syskey", "syssecret"),
        RecordingTransport::with_responses(responses),
    )
}

pub(crate) fn dev_client(responses: Vec<Envelope>) -> Client<RecordingTransport> {
    Client::with_transport(
        Role::Developer,
        Identity::new().with_system("syskey", "syssecret"),
        RecordingTransport::with_responses(responses),
    )
}

pub(crate) fn device_client(responses: Vec<Envelope>) -> Client<RecordingTransport> {
    Client::with_transport(
        Role::Device,
        Identity::new()
            .with_system("syskey", "syssecret")
            .with_device("sensor-1", "activekey"),
        RecordingTransport::with_responses(responses),
    )
}

// Fixture shorthands below panic on a shape mismatch, which in a test is
// the right failure mode.

pub(crate) fn condition(value: Value) -> Condition {
    match value {
        Value::Object(object) => object,
        other => panic!("A condition must be a JSON object, got: {other}"),
    }
}

pub(crate) fn changes(value: Value) -> Map<String, Value> {
    condition(value)
}

pub(crate) fn object_body(value: Value) -> Body {
    match value {
        Value::Object(object) => Body::Object(object),
        other => panic!("Expected a JSON object fixture, got: {other}"),
    }
}

pub(crate) fn ok_response(value: Value) -> Envelope {
    Envelope::new(200, object_body(value))
}

pub(crate) fn array_response(value: Value) -> Envelope {
    match value {
        Value::Array(items) => Envelope::new(200, Body::Array(items)),
        other => panic!("Expected a JSON array fixture, got: {other}"),
    }
}
