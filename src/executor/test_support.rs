//! Scripted [`SpeedClient`] for deterministic measurement tests

use crate::client::{SpeedClient, Transfer};
use crate::error::AppError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub limit: Option<Duration>,
    pub body_len: usize,
}

enum Scripted {
    Ok { body: Bytes, elapsed: Duration },
    Fail { elapsed: Duration },
}

/// Replays queued transfers in order; once the queue is empty every call
/// completes instantly with an empty body.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get(self, bytes: usize, elapsed: Duration) -> Self {
        self.push(Scripted::Ok {
            body: Bytes::from(vec![0u8; bytes]),
            elapsed,
        })
    }

    pub fn with_body(self, body: &'static str, elapsed: Duration) -> Self {
        self.push(Scripted::Ok {
            body: Bytes::from_static(body.as_bytes()),
            elapsed,
        })
    }

    pub fn with_failure(self, elapsed: Duration) -> Self {
        self.push(Scripted::Fail { elapsed })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn push(self, entry: Scripted) -> Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }

    fn next(&self, call: RecordedCall) -> Transfer {
        self.calls.lock().unwrap().push(call);
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Ok { body, elapsed }) => Transfer::completed(body, elapsed, 200),
            Some(Scripted::Fail { elapsed }) => {
                Transfer::failed(AppError::network("connection refused"), elapsed)
            }
            None => Transfer::completed(Bytes::new(), Duration::ZERO, 200),
        }
    }
}

#[async_trait]
impl SpeedClient for ScriptedClient {
    async fn get(&self, url: &str, limit: Option<Duration>) -> Transfer {
        self.next(RecordedCall {
            method: "GET",
            url: url.to_string(),
            limit,
            body_len: 0,
        })
    }

    async fn post(&self, url: &str, body: Bytes, limit: Option<Duration>) -> Transfer {
        self.next(RecordedCall {
            method: "POST",
            url: url.to_string(),
            limit,
            body_len: body.len(),
        })
    }
}
