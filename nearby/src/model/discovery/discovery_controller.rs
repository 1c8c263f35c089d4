use std::{sync::Arc, time::Duration};

use nearby_core::model::{CommunityPlaceSource, PlaceCategory};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, Instant, Interval, MissedTickBehavior},
};

use super::{
    DiscoveryEvent, DiscoverySettings, DiscoveryState, DiscoveryView, Effect, RealtimeStatus,
};
use crate::model::{
    curated::{CuratedChange, CuratedPlaceStore, RealtimeSubscription},
    geo::{GeoWatcher, PositionProvider},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryCommand {
    EnableLive,
    DisableLive,
    Refresh,
    SetCategory(Option<PlaceCategory>),
    Shutdown,
}

/// the consumer side of a running [`DiscoveryController`]. sending returns
/// false once the controller has shut down.
#[derive(Debug, Clone)]
pub struct DiscoveryHandle {
    commands: mpsc::UnboundedSender<DiscoveryCommand>,
    view: watch::Receiver<DiscoveryView>,
}

impl DiscoveryHandle {
    pub fn enable_live(&self) -> bool {
        self.send(DiscoveryCommand::EnableLive)
    }

    pub fn disable_live(&self) -> bool {
        self.send(DiscoveryCommand::DisableLive)
    }

    pub fn refresh(&self) -> bool {
        self.send(DiscoveryCommand::Refresh)
    }

    pub fn set_category(&self, category: Option<PlaceCategory>) -> bool {
        self.send(DiscoveryCommand::SetCategory(category))
    }

    pub fn shutdown(&self) -> bool {
        self.send(DiscoveryCommand::Shutdown)
    }

    /// the latest published view
    pub fn view(&self) -> DiscoveryView {
        self.view.borrow().clone()
    }

    /// a receiver notified on every published view
    pub fn subscribe(&self) -> watch::Receiver<DiscoveryView> {
        self.view.clone()
    }

    fn send(&self, command: DiscoveryCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

/// runs the discovery state machine. a single task owns the state, the
/// position watch and the realtime subscription. fetches run as spawned tasks
/// that report back as tagged events, and at most one fetch of each kind is in
/// flight.
pub struct DiscoveryController {
    state: DiscoveryState,
    refetch_interval: Option<Duration>,
    geo: GeoWatcher,
    store: Arc<CuratedPlaceStore>,
    community: Arc<dyn CommunityPlaceSource>,
    commands: mpsc::UnboundedReceiver<DiscoveryCommand>,
    results_tx: mpsc::UnboundedSender<DiscoveryEvent>,
    results: mpsc::UnboundedReceiver<DiscoveryEvent>,
    view: watch::Sender<DiscoveryView>,
    realtime: Option<RealtimeSubscription>,
    curated_task: Option<JoinHandle<()>>,
    community_task: Option<JoinHandle<()>>,
}

impl DiscoveryController {
    pub fn new(
        settings: DiscoverySettings,
        provider: Arc<dyn PositionProvider>,
        store: Arc<CuratedPlaceStore>,
        community: Arc<dyn CommunityPlaceSource>,
    ) -> (Self, DiscoveryHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (results_tx, results) = mpsc::unbounded_channel();
        let state = DiscoveryState::new(settings.clone());
        let (view_tx, view_rx) = watch::channel(state.view());
        let controller = Self {
            state,
            refetch_interval: settings.refetch_interval,
            geo: GeoWatcher::new(provider, settings.watch_options),
            store,
            community,
            commands,
            results_tx,
            results,
            view: view_tx,
            realtime: None,
            curated_task: None,
            community_task: None,
        };
        let handle = DiscoveryHandle {
            commands: commands_tx,
            view: view_rx,
        };
        (controller, handle)
    }

    /// process events until shutdown, or until every handle is dropped.
    pub async fn run(mut self) {
        let mut refetch = self.refetch_interval.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        self.open_realtime();
        self.dispatch(DiscoveryEvent::Started);

        loop {
            let degraded = self.state.realtime() == RealtimeStatus::Degraded;
            let event = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(DiscoveryCommand::EnableLive) => DiscoveryEvent::EnableLive,
                    Some(DiscoveryCommand::DisableLive) => DiscoveryEvent::DisableLive,
                    Some(DiscoveryCommand::Refresh) => DiscoveryEvent::Refresh,
                    Some(DiscoveryCommand::SetCategory(c)) => DiscoveryEvent::SetCategory(c),
                    Some(DiscoveryCommand::Shutdown) | None => break,
                },
                Some(result) = self.results.recv() => result,
                Some(fix) = self.geo.next_fix() => match fix {
                    Ok(center) => DiscoveryEvent::PositionFix(center),
                    Err(e) => DiscoveryEvent::PositionFailed(e),
                },
                change = next_change(&mut self.realtime) => match change {
                    Some(change) => DiscoveryEvent::Realtime(change),
                    None => DiscoveryEvent::SubscriptionClosed,
                },
                _ = next_tick(&mut refetch), if degraded => DiscoveryEvent::RefetchCurated,
            };
            if event == DiscoveryEvent::SubscriptionClosed {
                log::warn!("curated realtime channel closed, falling back to re-fetching");
                self.realtime = None;
            }
            self.dispatch(event);
        }
        self.shutdown();
    }

    fn open_realtime(&mut self) {
        match self.store.subscribe() {
            Ok(subscription) => {
                self.realtime = Some(subscription);
                self.dispatch(DiscoveryEvent::SubscriptionOpened);
            }
            Err(e) => {
                match self.refetch_interval {
                    Some(period) => log::warn!("{e}, re-fetching curated places every {period:?}"),
                    None => log::warn!("{e}, curated places update on refresh only"),
                }
                self.dispatch(DiscoveryEvent::SubscriptionFailed(e));
            }
        }
    }

    fn dispatch(&mut self, event: DiscoveryEvent) {
        for effect in self.state.apply(event) {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartWatch => {
                if let Err(e) = self.geo.start() {
                    let _ = self.results_tx.send(DiscoveryEvent::PositionFailed(e));
                }
            }
            Effect::StopWatch => self.geo.stop(),
            Effect::CancelFetches => {
                abort(&mut self.curated_task);
                abort(&mut self.community_task);
            }
            Effect::FetchBase { seq, filter } => {
                let store = self.store.clone();
                let tx = self.results_tx.clone();
                let task = tokio::spawn(async move {
                    let snapshot = store.fetch_all(&filter).await;
                    let _ = tx.send(DiscoveryEvent::BaseLoaded { seq, snapshot });
                });
                replace(&mut self.curated_task, task);
            }
            Effect::FetchNearby {
                seq,
                center,
                radius_km,
                category,
            } => {
                let store = self.store.clone();
                let tx = self.results_tx.clone();
                let task = tokio::spawn(async move {
                    let snapshot = store.fetch_nearby(center, radius_km, category).await;
                    let _ = tx.send(DiscoveryEvent::NearbyLoaded { seq, snapshot });
                });
                replace(&mut self.curated_task, task);
            }
            Effect::QueryCommunity {
                seq,
                center,
                radius_meters,
            } => {
                let community = self.community.clone();
                let tx = self.results_tx.clone();
                let task = tokio::spawn(async move {
                    let places = community.query(center, radius_meters).await;
                    let _ = tx.send(DiscoveryEvent::CommunityLoaded { seq, places });
                });
                replace(&mut self.community_task, task);
            }
            Effect::Publish => {
                self.view.send_replace(self.state.view());
            }
        }
    }

    fn shutdown(&mut self) {
        abort(&mut self.curated_task);
        abort(&mut self.community_task);
        self.realtime = None;
        self.store.unsubscribe();
        self.geo.stop();
        log::info!("discovery controller stopped");
    }
}

fn replace(slot: &mut Option<JoinHandle<()>>, task: JoinHandle<()>) {
    if let Some(previous) = slot.replace(task) {
        previous.abort();
    }
}

fn abort(slot: &mut Option<JoinHandle<()>>) {
    if let Some(task) = slot.take() {
        task.abort();
    }
}

async fn next_change(subscription: &mut Option<RealtimeSubscription>) -> Option<CuratedChange> {
    match subscription {
        Some(s) => s.next().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(i) => {
            i.tick().await;
        }
        None => std::future::pending().await,
    }
}
