//! Application controller
//!
//! Single owner of the session user, the snap feed, the selection, the
//! notification banner, the capture flow and the marker registry. Nothing
//! here awaits; async work lives in [`super::runtime`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wsr_common::events::{EventBus, WsrEvent};
use wsr_common::time;
use wsr_common::{GeoPoint, Snap, SnapId, User};

use super::{
    CaptureView, MapStatus, NotificationView, Screen, ShellError, ShellSettings, UiEvent,
    ViewSnapshot, ANONYMOUS_SENDER, ONBOARDING_HINT, ONBOARDING_HINT_MAX_SNAPS,
};
use crate::capture::{
    CameraStream, CaptureFlow, CaptureState, DeviceError, FlowId, PendingSend, StreamGuard,
};
use crate::map::{MapError, MapView, MarkerReconciler, ReconcileStats};
use crate::services::{ScheduledTask, SnapFeed};

struct Notification {
    id: u64,
    message: String,
}

pub struct AppController<M: MapView> {
    bus: EventBus,
    settings: ShellSettings,
    user: Option<User>,
    feed: SnapFeed,
    selected: Option<Arc<Snap>>,
    notification: Option<Notification>,
    next_notification_id: u64,
    location: Option<GeoPoint>,
    capture: Option<CaptureFlow>,
    map: M,
    map_status: MapStatus,
    reconciler: MarkerReconciler,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    simulator: Option<ScheduledTask>,
    timers: Vec<ScheduledTask>,
}

impl<M: MapView> AppController<M> {
    pub fn new(bus: EventBus, settings: ShellSettings, map: M, feed: SnapFeed) -> Self {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();

        let click_tx = ui_tx.clone();
        let reconciler = MarkerReconciler::new(Arc::new(move |snap: Arc<Snap>| {
            // Receiver lives as long as the controller
            let _ = click_tx.send(UiEvent::SnapSelected(snap));
        }));

        Self {
            bus,
            settings,
            user: None,
            feed,
            selected: None,
            notification: None,
            next_notification_id: 1,
            location: None,
            capture: None,
            map,
            map_status: MapStatus::Loading,
            reconciler,
            ui_tx,
            ui_rx,
            simulator: None,
            timers: Vec::new(),
        }
    }

    fn emit(&self, event: WsrEvent) {
        self.bus.emit_lossy(event);
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Mock sign-in; an existing session is returned unchanged
    pub fn login(&mut self, name: Option<&str>) -> User {
        if let Some(user) = &self.user {
            debug!(user = %user.name, "Login while already signed in");
            return user.clone();
        }

        let user = User::mock(name);
        info!(user_id = %user.id, name = %user.name, "Session started");
        self.user = Some(user.clone());
        self.emit(WsrEvent::SessionStarted {
            user: user.clone(),
            timestamp: time::now(),
        });

        self.reconcile();
        user
    }

    /// End the session: stop timers, close the camera, clear transient UI
    pub fn logout(&mut self) -> bool {
        if self.user.is_none() {
            return false;
        }

        if let Some(simulator) = self.simulator.take() {
            simulator.cancel();
        }
        self.timers.clear();
        self.close_capture();
        self.dismiss_selection();
        self.dismiss_notification(None);

        let removed = self.reconciler.clear(&mut self.map);
        self.user = None;

        info!(markers_removed = removed, "Session ended");
        self.emit(WsrEvent::SessionEnded {
            timestamp: time::now(),
        });
        true
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn screen(&self) -> Screen {
        if self.user.is_some() {
            Screen::Main
        } else {
            Screen::Login
        }
    }

    /// Device location, reported once by the page
    pub fn set_location(&mut self, position: GeoPoint) {
        info!(%position, "Device location reported");
        self.location = Some(position);
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    // ------------------------------------------------------------------
    // Feed and selection
    // ------------------------------------------------------------------

    pub fn append(&mut self, snap: Snap) -> Arc<Snap> {
        let snap = self.feed.append(snap);
        debug!(snap_id = %snap.id(), sender = snap.sender_name(), "Snap added to feed");

        self.emit(WsrEvent::SnapAdded {
            snap: snap.as_ref().clone(),
            feed_len: self.feed.len(),
            timestamp: time::now(),
        });
        self.reconcile();
        snap
    }

    pub fn feed(&self) -> &SnapFeed {
        &self.feed
    }

    pub fn select(&mut self, id: &SnapId) -> Result<Arc<Snap>, ShellError> {
        let snap = self
            .feed
            .get(id)
            .cloned()
            .ok_or_else(|| ShellError::UnknownSnap(id.to_string()))?;
        self.select_snap(Arc::clone(&snap));
        Ok(snap)
    }

    pub fn select_snap(&mut self, snap: Arc<Snap>) {
        debug!(snap_id = %snap.id(), "Snap selected");
        self.emit(WsrEvent::SnapSelected {
            snap: snap.as_ref().clone(),
            timestamp: time::now(),
        });
        self.selected = Some(snap);
    }

    pub fn selected(&self) -> Option<&Arc<Snap>> {
        self.selected.as_ref()
    }

    pub fn dismiss_selection(&mut self) -> bool {
        if self.selected.take().is_none() {
            return false;
        }
        self.emit(WsrEvent::SelectionCleared {
            timestamp: time::now(),
        });
        true
    }

    // ------------------------------------------------------------------
    // Notification banner
    // ------------------------------------------------------------------

    /// Show `message`, replacing any current notification; returns its id
    pub fn notify(&mut self, message: impl Into<String>) -> u64 {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        let message = message.into();

        debug!(notification_id = id, %message, "Notification shown");
        self.emit(WsrEvent::NotificationShown {
            notification_id: id,
            message: message.clone(),
            timestamp: time::now(),
        });
        self.notification = Some(Notification { id, message });
        id
    }

    /// Hide the notification
    ///
    /// With `Some(id)` only that notification is hidden; a newer one stays.
    pub fn dismiss_notification(&mut self, id: Option<u64>) -> bool {
        let current = match &self.notification {
            Some(n) if id.map_or(true, |id| id == n.id) => n.id,
            _ => return false,
        };

        self.notification = None;
        self.emit(WsrEvent::NotificationDismissed {
            notification_id: current,
            timestamp: time::now(),
        });
        true
    }

    pub fn notification_id(&self) -> Option<u64> {
        self.notification.as_ref().map(|n| n.id)
    }

    // ------------------------------------------------------------------
    // Scheduled work
    // ------------------------------------------------------------------

    /// Install the inbound simulator; replaces (and cancels) a previous one
    pub fn attach_simulator(&mut self, task: ScheduledTask) {
        if self.simulator.replace(task).is_some() {
            debug!("Replaced running inbound simulator");
        }
    }

    pub fn has_simulator(&self) -> bool {
        self.simulator.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Keep a session-scoped timer alive until logout
    pub fn add_timer(&mut self, task: ScheduledTask) {
        self.timers.retain(|t| !t.is_finished());
        self.timers.push(task);
    }

    // ------------------------------------------------------------------
    // Map
    // ------------------------------------------------------------------

    pub fn map_is_ready(&self) -> bool {
        self.map.is_ready()
    }

    pub fn map_status(&self) -> MapStatus {
        self.map_status
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Initialize the map (once) and place markers for the feed
    pub fn init_map(&mut self) -> Result<ReconcileStats, MapError> {
        if !self.map.is_initialized() {
            self.map.init(&self.settings.map)?;
            self.map_status = MapStatus::Ready;
            info!("Map ready");
        }
        Ok(self.reconcile())
    }

    /// Sync markers with the feed; no-op without a session or map
    pub fn reconcile(&mut self) -> ReconcileStats {
        if self.user.is_none() {
            return ReconcileStats::default();
        }
        self.reconciler.reconcile(&self.feed, &mut self.map)
    }

    pub fn marker_count(&self) -> usize {
        self.reconciler.len()
    }

    // ------------------------------------------------------------------
    // UI events
    // ------------------------------------------------------------------

    /// Apply all queued UI events; returns how many were handled
    pub fn drain_ui_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.ui_rx.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    pub fn ui_sender(&self) -> mpsc::UnboundedSender<UiEvent> {
        self.ui_tx.clone()
    }

    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::SnapSelected(snap) => self.select_snap(snap),
            UiEvent::SnapSubmitted(snap) => {
                self.append(snap);
            }
            UiEvent::NotificationDismissed(id) => {
                self.dismiss_notification(Some(id));
            }
        }
    }

    // ------------------------------------------------------------------
    // Capture flow
    // ------------------------------------------------------------------

    fn emit_capture_state(&self, flow: &CaptureFlow) {
        self.emit(WsrEvent::CaptureStateChanged {
            flow_id: flow.id(),
            state: flow.state().name().to_string(),
            message: flow.state().message().map(str::to_string),
            timestamp: time::now(),
        });
    }

    fn flow_mut(&mut self) -> Result<&mut CaptureFlow, ShellError> {
        self.capture.as_mut().ok_or(ShellError::NoCaptureFlow)
    }

    /// Start a new capture flow in `Idle`, replacing any current one
    pub fn open_capture(&mut self) -> Result<FlowId, ShellError> {
        if self.user.is_none() {
            return Err(ShellError::NoSession);
        }
        self.close_capture();

        let flow = CaptureFlow::new();
        let id = flow.id();
        info!(flow_id = %id, "Capture opened");
        self.emit_capture_state(&flow);
        self.capture = Some(flow);
        Ok(id)
    }

    /// Deliver a camera acquisition result to flow `flow_id`
    ///
    /// A stream for a flow that no longer exists is released.
    pub fn camera_opened(
        &mut self,
        flow_id: FlowId,
        result: Result<Box<dyn CameraStream>, DeviceError>,
    ) -> Result<(), ShellError> {
        let flow = match self.capture.as_mut() {
            Some(flow) if flow.id() == flow_id => flow,
            _ => {
                debug!(%flow_id, "Camera result for stale flow, releasing");
                drop(result.map(StreamGuard::new));
                return Err(ShellError::NoCaptureFlow);
            }
        };

        flow.camera_opened(result)?;
        if let Some(flow) = &self.capture {
            self.emit_capture_state(flow);
        }
        Ok(())
    }

    pub fn take_still(&mut self) -> Result<(), ShellError> {
        self.flow_mut()?.take_still()?;
        if let Some(flow) = &self.capture {
            self.emit_capture_state(flow);
        }
        Ok(())
    }

    pub fn retake(&mut self) -> Result<(), ShellError> {
        self.flow_mut()?.retake()?;
        if let Some(flow) = &self.capture {
            self.emit_capture_state(flow);
        }
        Ok(())
    }

    /// Move `Captured → Sending` using the device location
    ///
    /// `Ok(None)` when the location is unknown: nothing changes.
    pub fn begin_send(&mut self) -> Result<Option<PendingSend>, ShellError> {
        let location = self.location;
        let pending = self.flow_mut()?.begin_send(location)?;
        if pending.is_some() {
            if let Some(flow) = &self.capture {
                self.emit_capture_state(flow);
            }
        }
        Ok(pending)
    }

    /// Finish the send of flow `flow_id` with the AI results
    ///
    /// Results for a flow that was closed or replaced are discarded and
    /// `None` is returned.
    pub fn complete_send(
        &mut self,
        flow_id: FlowId,
        caption: String,
        place_name: String,
    ) -> Result<Option<Arc<Snap>>, ShellError> {
        let Some(flow) = self.capture.as_mut().filter(|f| f.id() == flow_id) else {
            debug!(%flow_id, "Send result for stale flow discarded");
            return Ok(None);
        };
        if flow.state() != &CaptureState::Sending {
            debug!(%flow_id, state = flow.state().name(), "Send result discarded");
            return Ok(None);
        }

        let Some(position) = self.location else {
            // begin_send required a location; it cannot be unset since
            warn!(%flow_id, "Location vanished during send");
            return Ok(None);
        };

        let image = flow.complete_send()?;
        if let Some(flow) = self.capture.take() {
            self.emit_capture_state(&flow);
        }

        let sender = self
            .user
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| ANONYMOUS_SENDER.to_string());

        let snap = Snap::new(
            SnapId::generate(),
            image.data_url(),
            position,
            sender,
            time::now_millis(),
        )
        .with_location_name(place_name)
        .with_caption(caption);

        info!(snap_id = %snap.id(), %position, "Own snap submitted");
        Ok(Some(self.append(snap)))
    }

    /// Close the current capture flow, releasing the camera
    pub fn close_capture(&mut self) -> bool {
        let Some(mut flow) = self.capture.take() else {
            return false;
        };
        flow.close();
        self.emit_capture_state(&flow);
        true
    }

    pub fn capture(&self) -> Option<&CaptureFlow> {
        self.capture.as_ref()
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn view(&self) -> ViewSnapshot {
        let screen = self.screen();
        let hint = (screen == Screen::Main && self.feed.len() <= ONBOARDING_HINT_MAX_SNAPS)
            .then_some(ONBOARDING_HINT);

        ViewSnapshot {
            screen,
            user: self.user.clone(),
            feed_len: self.feed.len(),
            selected: self.selected.as_ref().map(|s| s.as_ref().clone()),
            notification: self.notification.as_ref().map(|n| NotificationView {
                id: n.id,
                message: n.message.clone(),
            }),
            hint,
            map_status: self.map_status,
            markers: self.reconciler.len(),
            location: self.location,
            capture: self.capture.as_ref().map(|flow| CaptureView {
                flow_id: flow.id(),
                state: flow.state().clone(),
                can_send: self.location.is_some(),
            }),
        }
    }

    /// Owned copy of the feed, newest first
    pub fn snaps(&self) -> Vec<Snap> {
        self.feed.to_vec()
    }
}
