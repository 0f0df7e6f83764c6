use std::collections::HashMap;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::stream;
use futures::StreamExt as _;
use futures::TryStreamExt as _;

use super::*;

/// Scripted log output of one pod.
#[derive(Clone, Debug)]
pub(super) enum Logs {
    /// Lines followed by a clean end of stream.
    Finished(Vec<&'static str>),
    /// Lines, then silence forever.
    Hanging(Vec<&'static str>),
    /// Raw chunks that need not be UTF-8, then silence forever.
    HangingBytes(Vec<&'static [u8]>),
    /// Lines, then a read error.
    Broken(Vec<&'static str>),
}

/// Replies handed out in order; the last one repeats.
#[derive(Debug)]
struct Script<T>(VecDeque<T>);

impl<T: Clone> Script<T> {
    fn new(replies: impl IntoIterator<Item = T>) -> Self {
        Self(replies.into_iter().collect())
    }

    fn next(&mut self) -> Option<T> {
        if self.0.len() > 1 {
            self.0.pop_front()
        } else {
            self.0.front().cloned()
        }
    }
}

/// In-memory cluster. A `None` list reply is a failing API call.
#[derive(Debug, Default)]
pub(super) struct MockApi {
    lists: Mutex<HashMap<String, Script<Option<Vec<corev1::Pod>>>>>,
    pods: Mutex<HashMap<String, Script<Option<corev1::Pod>>>>,
    logs: Mutex<HashMap<String, Logs>>,
    texts: Mutex<HashMap<String, String>>,
    log_requests: Mutex<Vec<LogParams>>,
    list_calls: AtomicUsize,
}

impl MockApi {
    pub(super) fn with_list<I>(self, selector: &str, replies: I) -> Self
    where
        I: IntoIterator<Item = Vec<corev1::Pod>>,
    {
        let script = Script::new(replies.into_iter().map(Some));
        self.lists.lock().unwrap().insert(selector.to_string(), script);
        self
    }

    pub(super) fn with_failing_list(self, selector: &str) -> Self {
        let script = Script::new([None]);
        self.lists.lock().unwrap().insert(selector.to_string(), script);
        self
    }

    pub(super) fn with_pod<I>(self, name: &str, states: I) -> Self
    where
        I: IntoIterator<Item = Option<corev1::Pod>>,
    {
        let script = Script::new(states);
        self.pods.lock().unwrap().insert(name.to_string(), script);
        self
    }

    pub(super) fn with_logs(self, pod: &str, logs: Logs) -> Self {
        self.logs.lock().unwrap().insert(pod.to_string(), logs);
        self
    }

    pub(super) fn with_text(self, pod: &str, text: &str) -> Self {
        self.texts
            .lock()
            .unwrap()
            .insert(pod.to_string(), text.to_string());
        self
    }

    pub(super) fn log_requests(&self) -> Vec<LogParams> {
        self.log_requests.lock().unwrap().clone()
    }

    pub(super) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn next_list(&self, selector: &str) -> Option<Option<Vec<corev1::Pod>>> {
        let mut lists = self.lists.lock().unwrap();
        lists.get_mut(selector)?.next()
    }

    fn next_pod(&self, name: &str) -> Option<corev1::Pod> {
        let mut pods = self.pods.lock().unwrap();
        pods.get_mut(name)?.next()?
    }

    fn record(&self, params: &LogParams) {
        self.log_requests.lock().unwrap().push(params.clone());
    }
}

impl PodApi for MockApi {
    async fn list_pods(
        &self,
        _namespace: &str,
        selector: &str,
    ) -> kube::Result<Vec<corev1::Pod>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_list(selector) {
            Some(Some(pods)) => Ok(pods),
            Some(None) => Err(failure("list pods failed")),
            None => Ok(Vec::new()),
        }
    }

    async fn get_pod(
        &self,
        _namespace: &str,
        name: &str,
    ) -> kube::Result<Option<corev1::Pod>> {
        Ok(self.next_pod(name))
    }

    async fn log_stream(
        &self,
        _namespace: &str,
        name: &str,
        params: &LogParams,
    ) -> kube::Result<LogStream> {
        self.record(params);
        let logs = self.logs.lock().unwrap().get(name).cloned();
        let stream: LogStream = match logs {
            Some(Logs::Finished(lines)) => {
                Box::pin(futures::io::Cursor::new(lines.concat().into_bytes()))
            }
            Some(Logs::Hanging(lines)) => Box::pin(
                stream::iter(chunks(lines))
                    .chain(stream::pending())
                    .into_async_read(),
            ),
            Some(Logs::HangingBytes(chunks)) => {
                let chunks = chunks
                    .into_iter()
                    .map(|chunk| Ok(chunk.to_vec()))
                    .collect::<Vec<io::Result<Vec<u8>>>>();
                Box::pin(
                    stream::iter(chunks)
                        .chain(stream::pending())
                        .into_async_read(),
                )
            }
            Some(Logs::Broken(lines)) => {
                let mut chunks = chunks(lines);
                chunks.push(Err(io::Error::other("connection reset by peer")));
                Box::pin(stream::iter(chunks).into_async_read())
            }
            None => return Err(failure("log stream unavailable")),
        };
        Ok(stream)
    }

    async fn logs(
        &self,
        _namespace: &str,
        name: &str,
        params: &LogParams,
    ) -> kube::Result<String> {
        self.record(params);
        let text = self.texts.lock().unwrap().get(name).cloned();
        text.ok_or_else(|| failure("logs unavailable"))
    }
}

fn chunks(lines: Vec<&'static str>) -> Vec<io::Result<Vec<u8>>> {
    lines
        .into_iter()
        .map(|line| Ok(line.as_bytes().to_vec()))
        .collect()
}

fn failure(message: &str) -> kube::Error {
    kube::Error::ReadEvents(io::Error::other(message.to_string()))
}
