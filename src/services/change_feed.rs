//! In-process change feed.
//!
//! Mutations publish the [`Topic`] they touched; subscribers hold a
//! broadcast receiver and re-run their query whenever a relevant topic
//! arrives. Payloads are never sent through the channel, only the fact that
//! something changed, so a lagging receiver loses nothing by re-querying.

use crate::models::{EventId, PhotoId};
use futures::{Stream, stream};
use std::future::Future;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The events table changed.
    Events,
    /// A photo was added to this event.
    EventPhotos(EventId),
    /// A comment was added to this photo.
    PhotoComments(PhotoId),
    /// A blob finished uploading.
    Blobs,
}

impl Topic {
    /// Whether a watcher of `self` must refresh after `changed` is published.
    ///
    /// Photo lists embed resolved blob URLs, so they also refresh on `Blobs`.
    pub fn refreshed_by(&self, changed: &Topic) -> bool {
        self == changed || (matches!(self, Topic::EventPhotos(_)) && *changed == Topic::Blobs)
    }
}

#[derive(Clone, Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<Topic>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Announce a change. Having no subscribers is not an error.
    pub fn publish(&self, topic: Topic) {
        let receivers = self.sender.send(topic.clone()).unwrap_or(0);
        debug!("published {:?} to {} subscribers", topic, receivers);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Topic> {
        self.sender.subscribe()
    }

    /// Produce a stream of snapshots for `topic`.
    ///
    /// The first item is fetched immediately; each later item is fetched after
    /// a change that refreshes `topic`. The receiver is taken before the first
    /// fetch so no change between the two is missed. The stream ends when the
    /// feed is dropped.
    pub fn watch<T, F, Fut>(&self, topic: Topic, fetch: F) -> impl Stream<Item = T> + use<T, F, Fut>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
    {
        let receiver = self.subscribe();
        stream::unfold(
            (receiver, fetch, topic, true),
            |(mut receiver, mut fetch, topic, first)| async move {
                if !first {
                    loop {
                        match receiver.recv().await {
                            Ok(changed) if topic.refreshed_by(&changed) => break,
                            Ok(_) => continue,
                            Err(RecvError::Lagged(skipped)) => {
                                debug!("{:?} watcher lagged by {} changes", topic, skipped);
                                break;
                            }
                            Err(RecvError::Closed) => return None,
                        }
                    }
                }
                let snapshot = fetch().await;
                Some((snapshot, (receiver, fetch, topic, false)))
            },
        )
    }
}
