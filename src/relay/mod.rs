//! The privileged fetch relay and the controller-side bridge to it.
//!
//! `FetchRelay` is a stateless message responder: it accepts a serialized
//! `fetchContent` request, performs one HTTP GET on a worker thread and
//! answers exactly once through the responder it was handed. Failures of
//! any kind become `{"content": null}`.
//!
//! `RelayBridge` sits on the page side. It tags every request with the
//! controller's generation token and hands replies back through a channel
//! that the host polls from its event loop.

pub mod fetch;
pub mod protocol;

use std::sync::{mpsc, Arc};

use fetch::{Fetcher, HttpFetcher};
use protocol::{FetchResponse, RelayRequest};

pub use fetch::FetchError;

/// One-shot reply channel handed to the relay with each message.
pub type Responder = Box<dyn FnOnce(FetchResponse) + Send + 'static>;

/// What the relay did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The reply will arrive later; the transport must keep the channel open.
    Deferred,
    /// Not a message this relay answers. The responder was dropped unused.
    Unhandled,
}

/// A fetch the controller wants issued, stamped with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub request: RelayRequest,
}

pub struct FetchRelay {
    fetcher: Arc<dyn Fetcher>,
}

impl FetchRelay {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Relay backed by a real HTTP client.
    pub fn http() -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(HttpFetcher::new()?)))
    }

    pub fn handle_message(&self, raw: &str, respond: Responder) -> Dispatch {
        let url = match RelayRequest::from_json(raw) {
            Ok(RelayRequest::FetchContent { url }) => url,
            Err(e) => {
                log::debug!("relay ignoring message: {}", e);
                return Dispatch::Unhandled;
            }
        };

        let fetcher = Arc::clone(&self.fetcher);
        std::thread::spawn(move || {
            let content = match fetcher.fetch(&url) {
                Ok(text) => Some(text),
                Err(e) => {
                    log::warn!("Error fetching content for {}: {}", url, e);
                    None
                }
            };
            respond(FetchResponse { content });
        });
        Dispatch::Deferred
    }
}

/// Invoked from worker threads after a reply is queued, so a GUI host
/// can wake its event loop.
pub type Waker = Arc<dyn Fn() + Send + Sync + 'static>;

pub struct RelayBridge {
    relay: FetchRelay,
    tx: mpsc::Sender<(u64, String)>,
    rx: mpsc::Receiver<(u64, String)>,
    in_flight: usize,
    waker: Option<Waker>,
}

impl RelayBridge {
    pub fn new(relay: FetchRelay) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            relay,
            tx,
            rx,
            in_flight: 0,
            waker: None,
        }
    }

    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }

    /// Send a ticket across. Every submitted ticket produces exactly one
    /// entry from `poll`, even if the relay refuses the message.
    pub fn submit(&mut self, ticket: FetchTicket) {
        let generation = ticket.generation;
        self.in_flight += 1;

        let raw = match ticket.request.to_json() {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("could not encode relay request: {}", e);
                self.reply_now(generation);
                return;
            }
        };

        let tx = self.tx.clone();
        let waker = self.waker.clone();
        let respond: Responder = Box::new(move |response| {
            let _ = tx.send((generation, response.to_json()));
            if let Some(wake) = waker {
                wake();
            }
        });

        if self.relay.handle_message(&raw, respond) == Dispatch::Unhandled {
            self.reply_now(generation);
        }
    }

    fn reply_now(&self, generation: u64) {
        let _ = self.tx.send((generation, FetchResponse::failed().to_json()));
    }

    /// Drain every reply that has arrived, without blocking.
    pub fn poll(&mut self) -> Vec<(u64, FetchResponse)> {
        let mut out = Vec::new();
        while let Ok((generation, raw)) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let response = FetchResponse::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("malformed relay reply: {}", e);
                FetchResponse::failed()
            });
            out.push((generation, response));
        }
        out
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct StubFetcher;

    impl Fetcher for StubFetcher {
        fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if url.contains("fail") {
                Err(FetchError {
                    message: "connection refused".into(),
                })
            } else {
                Ok(format!("<title>{}</title>", url))
            }
        }
    }

    fn bridge() -> RelayBridge {
        RelayBridge::new(FetchRelay::new(Arc::new(StubFetcher)))
    }

    fn wait_for(bridge: &mut RelayBridge, n: usize) -> Vec<(u64, FetchResponse)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < n && Instant::now() < deadline {
            got.extend(bridge.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        got
    }

    #[test]
    fn fetch_content_is_deferred() {
        let relay = FetchRelay::new(Arc::new(StubFetcher));
        let (tx, rx) = mpsc::channel();
        let raw = r#"{"action":"fetchContent","url":"https://a.test/"}"#;
        let dispatch = relay.handle_message(raw, Box::new(move |r| {
            let _ = tx.send(r);
        }));
        assert_eq!(dispatch, Dispatch::Deferred);
        let reply = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reply.content.as_deref(), Some("<title>https://a.test/</title>"));
    }

    #[test]
    fn unknown_messages_are_unhandled() {
        let relay = FetchRelay::new(Arc::new(StubFetcher));
        let dispatch = relay.handle_message(r#"{"action":"ping"}"#, Box::new(|_| {}));
        assert_eq!(dispatch, Dispatch::Unhandled);
    }

    #[test]
    fn failures_become_null_content() {
        let mut bridge = bridge();
        bridge.submit(FetchTicket {
            generation: 7,
            request: RelayRequest::fetch("https://fail.test/"),
        });
        let got = wait_for(&mut bridge, 1);
        assert_eq!(got, vec![(7, FetchResponse::failed())]);
        assert_eq!(bridge.in_flight(), 0);
    }

    #[test]
    fn replies_carry_their_generation() {
        let mut bridge = bridge();
        for generation in 1..=3 {
            bridge.submit(FetchTicket {
                generation,
                request: RelayRequest::fetch(format!("https://a.test/{}", generation)),
            });
        }
        let mut got = wait_for(&mut bridge, 3);
        got.sort_by_key(|(g, _)| *g);
        let generations: Vec<u64> = got.iter().map(|(g, _)| *g).collect();
        assert_eq!(generations, vec![1, 2, 3]);
        assert_eq!(
            got[1].1.content.as_deref(),
            Some("<title>https://a.test/2</title>")
        );
    }
}
