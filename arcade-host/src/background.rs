use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arcade_core::{LeaderboardClient, LeaderboardEntry, ScoreTransport};

enum Request {
    Load,
    Submit { name: String, score: u32 },
}

/// Runs a [`LeaderboardClient`] on its own thread so the frame loop never waits on the
/// network. Requests are fire-and-forget; fresh lists come back through [`poll`].
///
/// [`poll`]: LeaderboardWorker::poll
pub struct LeaderboardWorker {
    requests: Option<Sender<Request>>,
    updates: Receiver<Vec<LeaderboardEntry>>,
    handle: Option<JoinHandle<()>>,
}

impl LeaderboardWorker {
    pub fn spawn<T>(transport: T) -> io::Result<Self>
    where
        T: ScoreTransport + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (update_tx, update_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("leaderboard".to_string())
            .spawn(move || {
                let mut client = LeaderboardClient::new(transport);
                for request in request_rx {
                    let refreshed = match request {
                        Request::Load => client.load(),
                        Request::Submit { name, score } => client.submit(&name, score),
                    };
                    if refreshed && update_tx.send(client.entries().to_vec()).is_err() {
                        break;
                    }
                }
                tracing::debug!("leaderboard worker stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            updates: update_rx,
            handle: Some(handle),
        })
    }

    pub fn request_load(&self) {
        self.send(Request::Load);
    }

    pub fn request_submit(&self, name: &str, score: u32) {
        self.send(Request::Submit {
            name: name.to_string(),
            score,
        });
    }

    /// Latest list the worker finished fetching since the previous poll, if any.
    pub fn poll(&self) -> Option<Vec<LeaderboardEntry>> {
        self.updates.try_iter().last()
    }

    /// Blocks for at most `timeout` waiting on the next list.
    pub fn wait(&self, timeout: Duration) -> Option<Vec<LeaderboardEntry>> {
        match self.updates.recv_timeout(timeout) {
            Ok(entries) => Some(entries),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    fn send(&self, request: Request) {
        let delivered = self
            .requests
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !delivered {
            tracing::warn!("leaderboard worker is gone; request dropped");
        }
    }
}

impl Drop for LeaderboardWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("leaderboard worker panicked");
            }
        }
    }
}
