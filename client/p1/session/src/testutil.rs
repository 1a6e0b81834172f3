//! Test doubles shared by the session tests.

use crate::transport::{IqResponse, LoginPath, Transport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scriptable in-memory transport recording everything the core sends.
pub(crate) struct MockTransport {
    elements: Mutex<Vec<Bytes>>,
    requests: Mutex<Vec<Bytes>>,
    responses: Mutex<VecDeque<IqResponse>>,
    raw_writes: AtomicUsize,
    fail_raw: AtomicBool,
    features: Mutex<HashSet<(String, String)>>,
    auth_calls: AtomicUsize,
    fail_auth: AtomicBool,
    login_paths: Mutex<Vec<LoginPath>>,
    stream_id: Mutex<Option<String>>,
    local_jid: Mutex<Option<String>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            elements: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            raw_writes: AtomicUsize::new(0),
            fail_raw: AtomicBool::new(false),
            features: Mutex::new(HashSet::new()),
            auth_calls: AtomicUsize::new(0),
            fail_auth: AtomicBool::new(false),
            login_paths: Mutex::new(Vec::new()),
            stream_id: Mutex::new(None),
            local_jid: Mutex::new(None),
        }
    }

    pub(crate) fn advertise(&self, element: &str, namespace: &str) {
        self.features
            .lock()
            .unwrap()
            .insert((element.to_string(), namespace.to_string()));
    }

    pub(crate) fn queue_response(&self, response: IqResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn fail_raw_writes(&self) {
        self.fail_raw.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_authentication(&self) {
        self.fail_auth.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_negotiated(&self, stream_id: &str, jid: &str) {
        *self.stream_id.lock().unwrap() = Some(stream_id.to_string());
        *self.local_jid.lock().unwrap() = Some(jid.to_string());
    }

    pub(crate) fn sent_elements(&self) -> Vec<Bytes> {
        self.elements.lock().unwrap().clone()
    }

    pub(crate) fn sent_requests(&self) -> Vec<Bytes> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn raw_write_count(&self) -> usize {
        self.raw_writes.load(Ordering::SeqCst)
    }

    pub(crate) fn auth_count(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn login_paths(&self) -> Vec<LoginPath> {
        self.login_paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_request(&self, payload: Bytes) -> Result<IqResponse, TransportError> {
        self.requests.lock().unwrap().push(payload);
        let scripted = self.responses.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or(IqResponse::Result))
    }

    async fn send_element(&self, payload: Bytes) -> Result<(), TransportError> {
        self.elements.lock().unwrap().push(payload);
        Ok(())
    }

    async fn write_raw(&self, _bytes: &[u8]) -> Result<(), TransportError> {
        self.raw_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_raw.load(Ordering::SeqCst) {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write failed",
            )));
        }
        Ok(())
    }

    fn has_feature(&self, element: &str, namespace: &str) -> bool {
        self.features
            .lock()
            .unwrap()
            .contains(&(element.to_string(), namespace.to_string()))
    }

    async fn authenticate(&self) -> Result<(), TransportError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth.load(Ordering::SeqCst) {
            return Err(TransportError::AuthenticationFailed(
                "not-authorized".to_string(),
            ));
        }
        Ok(())
    }

    async fn after_login(&self, path: LoginPath) {
        self.login_paths.lock().unwrap().push(path);
    }

    fn stream_id(&self) -> Option<String> {
        self.stream_id.lock().unwrap().clone()
    }

    fn local_jid(&self) -> Option<String> {
        self.local_jid.lock().unwrap().clone()
    }
}
