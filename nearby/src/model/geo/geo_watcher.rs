use std::sync::Arc;

use nearby_core::model::{Coordinates, DiscoveryError};
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

use super::{PositionFailure, PositionProvider, PositionUpdate, WatchId, WatchOptions};

/// an open platform watch. dropping it clears the watch.
struct ActiveWatch {
    id: WatchId,
    provider: Arc<dyn PositionProvider>,
    updates: mpsc::UnboundedReceiver<PositionUpdate>,
    /// set until the first fix arrives. later fixes are reported on movement.
    fix_deadline: Option<Instant>,
}

impl Drop for ActiveWatch {
    fn drop(&mut self) {
        log::debug!("clearing position watch {:?}", self.id);
        self.updates.close();
        self.provider.clear_watch(self.id);
    }
}

/// start/stop-able stream of position fixes over a [`PositionProvider`].
pub struct GeoWatcher {
    provider: Arc<dyn PositionProvider>,
    options: WatchOptions,
    active: Option<ActiveWatch>,
}

impl GeoWatcher {
    pub fn new(provider: Arc<dyn PositionProvider>, options: WatchOptions) -> Self {
        Self {
            provider,
            options,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// open the platform watch. starting an already started watcher keeps the
    /// existing stream.
    pub fn start(&mut self) -> Result<(), DiscoveryError> {
        if self.active.is_some() {
            log::debug!("position watch already running");
            return Ok(());
        }
        let (sink, updates) = mpsc::unbounded_channel();
        let id = self
            .provider
            .watch_position(&self.options, sink)
            .map_err(|e| DiscoveryError::PositionUnavailable(e.to_string()))?;
        log::debug!("opened position watch {id:?} with {:?}", self.options);
        self.active = Some(ActiveWatch {
            id,
            provider: self.provider.clone(),
            updates,
            fix_deadline: Instant::now().checked_add(self.options.timeout()),
        });
        Ok(())
    }

    /// release the platform watch. a no-op when not started.
    pub fn stop(&mut self) {
        self.active = None;
    }

    /// wait for the next fix. failures, invalid fixes, a closed provider
    /// stream and no first fix within [`WatchOptions::timeout`] are reported as
    /// [`DiscoveryError::PositionUnavailable`] and stop the watcher. returns
    /// None when the watcher is not started.
    ///
    /// cancel safe.
    pub async fn next_fix(&mut self) -> Option<Result<Coordinates, DiscoveryError>> {
        let watch = self.active.as_mut()?;
        let update = match watch.fix_deadline {
            Some(deadline) => time::timeout_at(deadline, watch.updates.recv())
                .await
                .unwrap_or(Some(PositionUpdate::Failed(PositionFailure::Timeout))),
            None => watch.updates.recv().await,
        };
        let failure = match update {
            Some(PositionUpdate::Fix(coordinates)) if coordinates.is_valid() => {
                watch.fix_deadline = None;
                return Some(Ok(coordinates));
            }
            Some(PositionUpdate::Fix(coordinates)) => {
                format!("received invalid position fix {coordinates}")
            }
            Some(PositionUpdate::Failed(failure)) => failure.to_string(),
            None => String::from("position stream closed by the platform"),
        };
        self.stop();
        Some(Err(DiscoveryError::PositionUnavailable(failure)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::geo::StaticPositionProvider;
    use std::time::Duration;

    fn watcher(provider: &Arc<StaticPositionProvider>) -> GeoWatcher {
        GeoWatcher::new(provider.clone(), WatchOptions::default())
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let provider = Arc::new(StaticPositionProvider::new(vec![Coordinates::new(1.0, 2.0)]));
        let mut geo = watcher(&provider);
        geo.start().unwrap();
        geo.start().unwrap();
        assert_eq!(provider.total_watches(), 1);
        assert_eq!(provider.active_watches(), 1);
        assert_eq!(geo.next_fix().await, Some(Ok(Coordinates::new(1.0, 2.0))));
    }

    #[tokio::test]
    async fn test_start_stop_does_not_leak_handles() {
        let provider = Arc::new(StaticPositionProvider::new(vec![]));
        let mut geo = watcher(&provider);
        for _ in 0..5 {
            geo.start().unwrap();
            assert_eq!(provider.active_watches(), 1);
            geo.stop();
            geo.stop();
            assert_eq!(provider.active_watches(), 0);
        }
        assert_eq!(provider.total_watches(), 5);
        assert_eq!(geo.next_fix().await, None);
    }

    #[tokio::test]
    async fn test_drop_releases_handle() {
        let provider = Arc::new(StaticPositionProvider::new(vec![]));
        {
            let mut geo = watcher(&provider);
            geo.start().unwrap();
            assert_eq!(provider.active_watches(), 1);
        }
        assert_eq!(provider.active_watches(), 0);
    }

    #[tokio::test]
    async fn test_failure_self_stops() {
        let provider = Arc::new(StaticPositionProvider::new(vec![]));
        let mut geo = watcher(&provider);
        geo.start().unwrap();
        provider.push(PositionUpdate::Failed(PositionFailure::Timeout));
        let next = geo.next_fix().await;
        assert!(matches!(
            next,
            Some(Err(DiscoveryError::PositionUnavailable(_)))
        ));
        assert!(!geo.is_active());
        assert_eq!(provider.active_watches(), 0);
    }

    #[tokio::test]
    async fn test_no_first_fix_times_out() {
        let provider = Arc::new(StaticPositionProvider::new(vec![]));
        let options = WatchOptions {
            timeout_ms: 50,
            ..Default::default()
        };
        let mut geo = GeoWatcher::new(provider.clone(), options);
        geo.start().unwrap();
        let next = time::timeout(Duration::from_secs(5), geo.next_fix())
            .await
            .unwrap();
        match next {
            Some(Err(DiscoveryError::PositionUnavailable(msg))) => {
                assert_eq!(msg, PositionFailure::Timeout.to_string())
            }
            other => panic!("expected a timeout, found {other:?}"),
        }
        assert!(!geo.is_active());
        assert_eq!(provider.active_watches(), 0);
    }

    #[tokio::test]
    async fn test_stationary_watch_keeps_running_after_first_fix() {
        let provider = Arc::new(StaticPositionProvider::new(vec![Coordinates::new(1.0, 2.0)]));
        let options = WatchOptions {
            timeout_ms: 50,
            ..Default::default()
        };
        let mut geo = GeoWatcher::new(provider.clone(), options);
        geo.start().unwrap();
        assert_eq!(geo.next_fix().await, Some(Ok(Coordinates::new(1.0, 2.0))));
        let waited = time::timeout(Duration::from_millis(200), geo.next_fix()).await;
        assert!(waited.is_err());
        assert!(geo.is_active());

        provider.push(PositionUpdate::Fix(Coordinates::new(1.5, 2.5)));
        assert_eq!(geo.next_fix().await, Some(Ok(Coordinates::new(1.5, 2.5))));
    }

    #[tokio::test]
    async fn test_invalid_fix_is_an_error() {
        let provider = Arc::new(StaticPositionProvider::new(vec![Coordinates::new(
            f64::NAN,
            1.0,
        )]));
        let mut geo = watcher(&provider);
        geo.start().unwrap();
        assert!(matches!(geo.next_fix().await, Some(Err(_))));
        assert!(!geo.is_active());
    }

    #[test]
    fn test_permission_denied() {
        let provider = Arc::new(StaticPositionProvider::denied());
        let mut geo = watcher(&provider);
        let result = geo.start();
        assert!(matches!(
            result,
            Err(DiscoveryError::PositionUnavailable(_))
        ));
        assert!(!geo.is_active());
    }
}
