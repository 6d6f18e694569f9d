use super::Responder;
use crate::model::{AiResponse, TestContent};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

enum Scripted {
    Text(String),
    Fail(String),
}

/// Scripted responder for tests. Replies are consumed in order; the last
/// reply repeats once the script runs out.
pub struct FakeResponder {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Option<String>>,
    delay: Option<Duration>,
}

impl FakeResponder {
    pub fn new(text: impl Into<String>) -> Self {
        Self::script(vec![text.into()])
    }

    pub fn script(replies: Vec<String>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().map(Scripted::Text).collect()),
            last: Mutex::new(None),
            delay: None,
        }
    }

    /// Every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let mut q = VecDeque::new();
        q.push_back(Scripted::Fail(message.into()));
        Self {
            script: Mutex::new(q),
            last: Mutex::new(None),
            delay: None,
        }
    }

    /// Sleep before answering; used to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Responder for FakeResponder {
    async fn respond(
        &self,
        _agent: &str,
        _prompt: &str,
        _content: &TestContent,
    ) -> anyhow::Result<AiResponse> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }

        let next = {
            let mut script = self
                .script
                .lock()
                .map_err(|_| anyhow::anyhow!("fake script poisoned"))?;
            match script.pop_front() {
                Some(Scripted::Fail(msg)) => {
                    script.push_front(Scripted::Fail(msg.clone()));
                    return Err(anyhow::anyhow!(msg));
                }
                Some(Scripted::Text(t)) => Some(t),
                None => None,
            }
        };

        let mut last = self
            .last
            .lock()
            .map_err(|_| anyhow::anyhow!("fake script poisoned"))?;
        let text = match next {
            Some(t) => {
                *last = Some(t.clone());
                t
            }
            None => last.clone().unwrap_or_default(),
        };

        Ok(AiResponse {
            text,
            source: self.provider_name().to_string(),
            meta: serde_json::json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
