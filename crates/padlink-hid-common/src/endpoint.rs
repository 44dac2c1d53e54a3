//! Endpoint traits

use std::time::Duration;

use async_trait::async_trait;

use crate::{HidCommonError, HidCommonResult};

#[async_trait]
pub trait InputEndpoint: Send {
    /// Read one transfer, giving up after `timeout`.
    async fn read_report(&mut self, timeout: Duration) -> HidCommonResult<Vec<u8>>;
}

#[async_trait]
pub trait OutputEndpoint: Send {
    /// Write one transfer and return how many bytes the device accepted.
    async fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize>;

    /// Write one transfer, treating a partial write as an error.
    async fn write_all(&mut self, data: &[u8]) -> HidCommonResult<()> {
        let written = self.write_report(data).await?;
        tracing::trace!(written, expected = data.len(), "endpoint write");
        if written < data.len() {
            return Err(HidCommonError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(())
    }
}

pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    enum MockRead {
        Data(Vec<u8>),
        Timeout,
        Error(String),
    }

    /// In-memory endpoint pair. Clones share the same queues, so a test can
    /// keep one handle while the session owns another.
    ///
    /// Reads pop from a queue; once it is drained the device reports
    /// [`HidCommonError::Disconnected`].
    #[derive(Debug, Clone, Default)]
    pub struct MockEndpoint {
        reads: Arc<Mutex<VecDeque<MockRead>>>,
        read_timeouts: Arc<Mutex<Vec<Duration>>>,
        writes: Arc<Mutex<Vec<Vec<u8>>>>,
        write_limit: Arc<Mutex<Option<usize>>>,
        write_error: Arc<Mutex<Option<String>>>,
    }

    impl MockEndpoint {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn queue_read(&self, data: impl Into<Vec<u8>>) {
            self.push(MockRead::Data(data.into()));
        }

        pub fn queue_timeout(&self) {
            self.push(MockRead::Timeout);
        }

        pub fn queue_read_error(&self, message: impl Into<String>) {
            self.push(MockRead::Error(message.into()));
        }

        fn push(&self, read: MockRead) {
            let mut queue = self.reads.lock().unwrap_or_else(|e| e.into_inner());
            queue.push_back(read);
        }

        pub fn pending_reads(&self) -> usize {
            self.reads.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        /// Timeouts passed to each `read_report` call, in order.
        pub fn read_timeouts(&self) -> Vec<Duration> {
            self.read_timeouts
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        pub fn get_write_history(&self) -> Vec<Vec<u8>> {
            self.writes
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        /// Accept at most `limit` bytes per write from now on.
        pub fn limit_writes(&self, limit: usize) {
            *self.write_limit.lock().unwrap_or_else(|e| e.into_inner()) = Some(limit);
        }

        /// Fail every write from now on.
        pub fn fail_writes(&self, message: impl Into<String>) {
            *self.write_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
        }
    }

    #[async_trait]
    impl InputEndpoint for MockEndpoint {
        async fn read_report(&mut self, timeout: Duration) -> HidCommonResult<Vec<u8>> {
            self.read_timeouts
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(timeout);
            let next = self
                .reads
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front();
            match next {
                Some(MockRead::Data(data)) => Ok(data),
                Some(MockRead::Timeout) => Err(HidCommonError::Timeout(timeout)),
                Some(MockRead::Error(message)) => Err(HidCommonError::ReadError(message)),
                None => Err(HidCommonError::Disconnected),
            }
        }
    }

    #[async_trait]
    impl OutputEndpoint for MockEndpoint {
        async fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
            if let Some(message) = self
                .write_error
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
            {
                return Err(HidCommonError::WriteError(message));
            }
            let limit = *self.write_limit.lock().unwrap_or_else(|e| e.into_inner());
            let accepted = limit.map_or(data.len(), |l| l.min(data.len()));
            let mut history = self.writes.lock().unwrap_or_else(|e| e.into_inner());
            history.push(data.get(..accepted).unwrap_or(data).to_vec());
            Ok(accepted)
        }
    }
}
