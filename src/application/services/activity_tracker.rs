//! In-flight generation markers, one per UI region

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;

/// Part of the wizard a generation call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityRegion {
    Curriculum,
    Content,
    Chapters,
    Questions,
}

/// Which key each region is currently generating for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySnapshot {
    pub curriculum: Option<String>,
    pub content: Option<String>,
    pub chapters: Option<String>,
    pub questions: Option<String>,
}

/// Tracks a single "currently loading" key per region.
///
/// A newer `begin` overwrites the region's marker. `finish` only clears the
/// marker when it still names the finishing key, so an older call that
/// completes late cannot erase a newer call's marker.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    in_flight: RwLock<HashMap<ActivityRegion, String>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin(&self, region: ActivityRegion, key: &str) {
        self.in_flight
            .write()
            .await
            .insert(region, key.to_string());
    }

    pub async fn finish(&self, region: ActivityRegion, key: &str) {
        let mut in_flight = self.in_flight.write().await;
        if in_flight.get(&region).is_some_and(|current| current == key) {
            in_flight.remove(&region);
        }
    }

    pub async fn snapshot(&self) -> ActivitySnapshot {
        let in_flight = self.in_flight.read().await;
        let get = |region| in_flight.get(&region).cloned();
        ActivitySnapshot {
            curriculum: get(ActivityRegion::Curriculum),
            content: get(ActivityRegion::Content),
            chapters: get(ActivityRegion::Chapters),
            questions: get(ActivityRegion::Questions),
        }
    }
}
