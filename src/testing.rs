//! Test doubles shared by the unit tests.

use crate::client::ChatTransport;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Reply a test feeds to a pending request
pub type Reply = std::result::Result<String, String>;

/// Transport whose replies are released by the test, in any order
#[derive(Default)]
pub struct ScriptedTransport {
    pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Register a pending reply for `text`; send on the returned handle to complete it
    pub fn expect(&self, text: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(text.to_string(), rx);
        tx
    }

    /// Texts received so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, text: &str) -> Result<String> {
        self.calls.lock().unwrap().push(text.to_string());
        let pending = self.pending.lock().unwrap().remove(text);

        match pending {
            Some(rx) => match rx.await {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(error)) => Err(anyhow!(error)),
                Err(_) => Err(anyhow!("reply for {text:?} was dropped")),
            },
            None => Err(anyhow!("no reply scripted for {text:?}")),
        }
    }
}
