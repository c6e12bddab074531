//! Async shell runtime
//!
//! Runs the suspension points of the application (camera acquisition, AI
//! calls, readiness polling, timers) around the shared controller. The
//! controller lock is never held across an `.await` on external work.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};
use wsr_common::time;
use wsr_common::{GeoPoint, Snap, User};

use super::{AppController, MapStatus, ShellError, UiEvent};
use crate::capture::{Camera, CaptureState};
use crate::map::{wait_until_ready, EventMapView};
use crate::services::inbound_simulator::{notification_message, InboundGenerator};
use crate::services::{CaptionClient, ScheduledTask};

pub type SharedController = Arc<Mutex<AppController<EventMapView>>>;

#[derive(Clone)]
pub struct Shell {
    controller: SharedController,
    captions: CaptionClient,
    camera: Arc<dyn Camera>,
}

impl Shell {
    pub fn new(
        controller: AppController<EventMapView>,
        captions: CaptionClient,
        camera: Arc<dyn Camera>,
    ) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            captions,
            camera,
        }
    }

    pub fn controller(&self) -> &SharedController {
        &self.controller
    }

    /// Sign in and start the inbound simulator for the session
    pub async fn login(&self, name: Option<&str>) -> User {
        let mut controller = self.controller.lock().await;
        let user = controller.login(name);

        if !controller.has_simulator() {
            let settings = controller.settings();
            let generator = InboundGenerator::new(settings.inbound_probability);
            let interval = settings.inbound_interval;
            let weak = Arc::downgrade(&self.controller);

            controller.attach_simulator(ScheduledTask::every(interval, move || {
                let weak = weak.clone();
                async move { inbound_tick(weak, generator).await }
            }));
            info!(interval_secs = interval.as_secs(), "Inbound simulator started");
        }
        user
    }

    pub async fn logout(&self) -> bool {
        self.controller.lock().await.logout()
    }

    /// Open a capture flow and acquire the camera
    pub async fn open_capture(&self) -> Result<CaptureState, ShellError> {
        let flow_id = self.controller.lock().await.open_capture()?;

        let result = self.camera.open().await;

        let mut controller = self.controller.lock().await;
        controller.camera_opened(flow_id, result)?;
        controller
            .capture()
            .map(|flow| flow.state().clone())
            .ok_or(ShellError::NoCaptureFlow)
    }

    /// Send the captured still: caption and place name, then the snap
    ///
    /// `Ok(None)` when sending is disabled (no location) or the flow was
    /// closed while the AI calls were running.
    pub async fn send_capture(&self) -> Result<Option<Arc<Snap>>, ShellError> {
        let Some(pending) = self.controller.lock().await.begin_send()? else {
            return Ok(None);
        };

        let caption = self
            .captions
            .describe_image(pending.image.bytes(), pending.image.mime_type())
            .await;
        let place_name = self.captions.resolve_place_name(pending.position).await;

        let mut controller = self.controller.lock().await;
        let Some(snap) = controller.complete_send(pending.flow_id, caption, place_name)? else {
            return Ok(None);
        };

        let reveal = controller.settings().own_snap_reveal;
        let weak = Arc::downgrade(&self.controller);
        let revealed = Arc::clone(&snap);
        controller.add_timer(ScheduledTask::once(reveal, async move {
            if let Some(controller) = weak.upgrade() {
                let mut controller = controller.lock().await;
                if controller.user().is_some() {
                    controller.dispatch(UiEvent::SnapSelected(revealed));
                }
            }
        }));

        Ok(Some(snap))
    }

    /// Prepend a snap from another user and announce it
    ///
    /// `None` without a session: the snap is dropped.
    pub async fn receive_inbound(&self, snap: Snap) -> Option<u64> {
        deliver_inbound(&self.controller, snap).await
    }

    /// Page reports its map library state; poll until ready, then init
    ///
    /// A `false` report answers with the current status right away; the page
    /// reports again once its library has loaded.
    pub async fn attach_map(&self, ready: bool) -> MapStatus {
        let policy = {
            let mut controller = self.controller.lock().await;
            controller.map_mut().set_ready(ready);
            if !ready {
                return controller.map_status();
            }
            controller.settings().readiness
        };

        let controller = &self.controller;
        let probe = move || async move { controller.lock().await.map_is_ready() };
        if wait_until_ready(policy, probe).await.is_err() {
            return self.controller.lock().await.map_status();
        }

        let mut controller = self.controller.lock().await;
        match controller.init_map() {
            Ok(stats) => debug!(added = stats.added, "Map attached"),
            Err(e) => debug!("Map init deferred: {}", e),
        }
        controller.map_status()
    }

    /// Route a marker click from the page to the selection
    pub async fn click_marker(&self, handle: crate::map::MarkerHandle) -> bool {
        let mut controller = self.controller.lock().await;
        if !controller.map().click(handle) {
            return false;
        }
        controller.drain_ui_events();
        true
    }

    pub async fn set_location(&self, position: GeoPoint) {
        self.controller.lock().await.set_location(position);
    }
}

async fn inbound_tick(weak: Weak<Mutex<AppController<EventMapView>>>, generator: InboundGenerator) {
    let Some(controller) = weak.upgrade() else {
        return;
    };

    let snap = {
        let mut rng = rand::thread_rng();
        generator.roll(&mut rng, time::now_millis())
    };
    if let Some(snap) = snap {
        deliver_inbound(&controller, snap).await;
    }
}

async fn deliver_inbound(controller: &SharedController, snap: Snap) -> Option<u64> {
    let mut guard = controller.lock().await;
    // A tick already waiting on the lock when logout ran must not land
    if guard.user().is_none() {
        debug!(sender = snap.sender_name(), "Inbound snap dropped, no session");
        return None;
    }

    let message = notification_message(snap.sender_name());
    guard.append(snap);
    let id = guard.notify(message);

    let weak = Arc::downgrade(controller);
    let after: Duration = guard.settings().notification;
    guard.add_timer(ScheduledTask::once(after, async move {
        if let Some(controller) = weak.upgrade() {
            controller
                .lock()
                .await
                .dispatch(UiEvent::NotificationDismissed(id));
        }
    }));
    Some(id)
}
