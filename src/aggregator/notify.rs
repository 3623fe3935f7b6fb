// Permission notices for the presentation layer, deduplicated by id

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::SourceId;

/// Stable id of the notice raised when the OS refuses access to network information.
pub const NETWORK_ACCESS_NOTICE_ID: &str = "network_access";

#[cfg(target_os = "windows")]
const NETWORK_SETTINGS_HINT: &str = "ms-settings:privacy-location";
#[cfg(target_os = "macos")]
const NETWORK_SETTINGS_HINT: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_LocationServices";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const NETWORK_SETTINGS_HINT: &str =
    "grant the service CAP_NET_ADMIN or run it as a member of the netdev group";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionNotice {
    pub id: String,
    pub source: SourceId,
    pub message: String,
    /// Where the user can grant the missing permission.
    pub settings_hint: String,
}

impl PermissionNotice {
    pub fn network_access() -> Self {
        Self {
            id: NETWORK_ACCESS_NOTICE_ID.into(),
            source: SourceId::Network,
            message: "Cannot read wireless network information: the operating system denied \
                      access. Allow this application to access network/location data to see \
                      the connected network and signal strength."
                .into(),
            settings_hint: NETWORK_SETTINGS_HINT.into(),
        }
    }
}

/// Receives permission notices. Called from the aggregator's cycle; must not block or call
/// back into the [`Notifier`].
pub trait NotificationSink: Send + Sync {
    fn on_permission_denied(&self, notice: &PermissionNotice);
}

/// Delivers each notice id to the sink at most once for the notifier's lifetime.
/// Create one per process and hand it to the aggregator.
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    raised: Mutex<HashSet<String>>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            raised: Mutex::new(HashSet::new()),
        }
    }

    /// Returns true when the notice was delivered, false when it was a duplicate.
    /// The id is only recorded once the sink returns, so a panicking sink gets the notice
    /// again on the next raise.
    pub fn raise(&self, notice: PermissionNotice) -> bool {
        let mut raised = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        if raised.contains(&notice.id) {
            return false;
        }
        tracing::warn!(notice_id = %notice.id, source = %notice.source, "permission notice raised");
        self.sink.on_permission_denied(&notice);
        raised.insert(notice.id);
        true
    }

    pub fn has_raised(&self, id: &str) -> bool {
        self.raised
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Sink that keeps delivered notices so the HTTP layer can list them.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<PermissionNotice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<PermissionNotice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for NoticeLog {
    fn on_permission_denied(&self, notice: &PermissionNotice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}
