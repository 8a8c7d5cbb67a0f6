use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ClientError;
use crate::models::{Receipt, ReceiptsSummary, UploadResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Upload,
    Receipts,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Upload, Tab::Receipts];

    pub fn name(self) -> &'static str {
        match self {
            Tab::Upload => "upload",
            Tab::Receipts => "receipts",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusBanner {
    pub message: String,
    pub is_error: bool,
    shown_at: Instant,
    auto_hide: Option<Duration>,
}

impl StatusBanner {
    pub fn persistent(message: impl Into<String>, is_error: bool) -> Self {
        StatusBanner {
            message: message.into(),
            is_error,
            shown_at: Instant::now(),
            auto_hide: None,
        }
    }

    pub fn transient(message: impl Into<String>, hide_after: Duration) -> Self {
        StatusBanner {
            message: message.into(),
            is_error: false,
            shown_at: Instant::now(),
            auto_hide: Some(hide_after),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        match self.auto_hide {
            Some(delay) => now.saturating_duration_since(self.shown_at) < delay,
            None => true,
        }
    }
}

/// One status area. Upload and receipts panels each own one.
#[derive(Debug, Clone, Default)]
pub struct StatusSlot {
    banner: Option<StatusBanner>,
}

impl StatusSlot {
    pub fn show(&mut self, message: impl Into<String>, is_error: bool) {
        self.banner = Some(StatusBanner::persistent(message, is_error));
    }

    pub fn show_transient(&mut self, message: impl Into<String>, hide_after: Duration) {
        self.banner = Some(StatusBanner::transient(message, hide_after));
    }

    pub fn hide(&mut self) {
        self.banner = None;
    }

    pub fn visible_at(&self, now: Instant) -> Option<&StatusBanner> {
        self.banner.as_ref().filter(|banner| banner.is_visible_at(now))
    }

    #[cfg(test)]
    pub fn visible(&self) -> Option<&StatusBanner> {
        self.visible_at(Instant::now())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptsView {
    Hidden,
    Loading,
    Loaded {
        receipts: Vec<Receipt>,
        summary: ReceiptsSummary,
    },
    Cleared,
}

/// Everything the surface needs to draw. Owned by the controller and
/// replaced wholesale by each flow.
#[derive(Debug, Clone)]
pub struct UiState {
    pub active_tab: Tab,
    pub upload_status: StatusSlot,
    pub receipts_status: StatusSlot,
    pub upload_disabled: bool,
    pub upload_result: Option<UploadResult>,
    pub download_link: Option<String>,
    pub receipts: ReceiptsView,
}

impl UiState {
    pub fn new(active_tab: Tab) -> Self {
        UiState {
            active_tab,
            upload_status: StatusSlot::default(),
            receipts_status: StatusSlot::default(),
            upload_disabled: false,
            upload_result: None,
            download_link: None,
            receipts: ReceiptsView::Hidden,
        }
    }

    pub fn is_active(&self, tab: Tab) -> bool {
        self.active_tab == tab
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Monotonic token source for one flow. Only the most recently issued
/// token may apply its response.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Idle,
    Pending(RequestToken),
}

/// Idle -> Pending -> Idle guard for a flow that must not overlap itself.
#[derive(Debug, Clone)]
pub struct FlowGate {
    name: &'static str,
    state: Arc<Mutex<GateState>>,
    sequence: Arc<RequestSequence>,
}

impl FlowGate {
    pub fn new(name: &'static str) -> Self {
        FlowGate {
            name,
            state: Arc::new(Mutex::new(GateState::Idle)),
            sequence: Arc::new(RequestSequence::default()),
        }
    }

    pub fn try_acquire(&self) -> Result<FlowPermit, ClientError> {
        let mut state = self.state.lock().map_err(|_| ClientError::Busy)?;
        if let GateState::Pending(token) = *state {
            debug!(flow = self.name, ?token, "flow busy");
            return Err(ClientError::Busy);
        }
        let token = self.sequence.issue();
        *state = GateState::Pending(token);
        debug!(flow = self.name, ?token, "flow pending");
        Ok(FlowPermit {
            name: self.name,
            token,
            state: self.state.clone(),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.state
            .lock()
            .map(|state| matches!(*state, GateState::Pending(_)))
            .unwrap_or(false)
    }
}

/// Held while a gated request is in flight; dropping it returns the gate
/// to idle on every exit path.
#[derive(Debug)]
pub struct FlowPermit {
    name: &'static str,
    token: RequestToken,
    state: Arc<Mutex<GateState>>,
}

impl FlowPermit {
    pub fn token(&self) -> RequestToken {
        self.token
    }
}

impl Drop for FlowPermit {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if *state == GateState::Pending(self.token) {
                *state = GateState::Idle;
                debug!(flow = self.name, token = ?self.token, "flow idle");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_parses_case_insensitively() {
        assert_eq!("Receipts".parse::<Tab>().unwrap(), Tab::Receipts);
        assert_eq!(" upload ".parse::<Tab>().unwrap(), Tab::Upload);
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn transient_banner_hides_after_delay() {
        let mut slot = StatusSlot::default();
        slot.show_transient("Receipt deleted", Duration::from_millis(3000));
        let shown_at = Instant::now();
        assert!(slot.visible_at(shown_at).is_some());
        assert!(slot.visible_at(shown_at + Duration::from_millis(3001)).is_none());
    }

    #[test]
    fn persistent_banner_stays_and_hide_is_idempotent() {
        let mut slot = StatusSlot::default();
        slot.show("Server error: boom", true);
        let later = Instant::now() + Duration::from_secs(3600);
        let banner = slot.visible_at(later).unwrap();
        assert!(banner.is_error);

        slot.hide();
        assert!(slot.visible().is_none());
        slot.hide();
        assert!(slot.visible().is_none());
    }

    #[test]
    fn sequence_only_latest_is_current() {
        let sequence = RequestSequence::default();
        let first = sequence.issue();
        let second = sequence.issue();
        assert!(first < second);
        assert!(!sequence.is_current(first));
        assert!(sequence.is_current(second));
    }

    #[test]
    fn gate_rejects_reentry_until_permit_dropped() {
        let gate = FlowGate::new("upload");
        let permit = gate.try_acquire().unwrap();
        assert!(gate.is_pending());
        assert!(matches!(gate.try_acquire(), Err(ClientError::Busy)));
        let first = permit.token();

        drop(permit);
        assert!(!gate.is_pending());
        let again = gate.try_acquire().unwrap();
        assert!(again.token() > first);
    }
}
