//! Notification payloads for region and POI entries.

use crate::domain::catalog::{ExpandedPoi, Region};
use crate::domain::ports::{
    Notification, NotificationChannel, POI_NOTIFICATION_BASE, REGION_NOTIFICATION_BASE,
};

pub(super) const fn region_notification_id(region_id: u32) -> u32 {
    REGION_NOTIFICATION_BASE + region_id
}

pub(super) const fn poi_notification_id(poi_id: u32) -> u32 {
    POI_NOTIFICATION_BASE + poi_id
}

pub(super) fn region_entered(region: &Region) -> Notification {
    Notification {
        channel: NotificationChannel::Region,
        id: region_notification_id(region.id()),
        title: "POITracker: Entered city.".to_owned(),
        body: format!("Welcome to {}! There are POI in this city.", region.name()),
    }
}

pub(super) fn poi_entered(poi: &ExpandedPoi) -> Notification {
    Notification {
        channel: NotificationChannel::Poi,
        id: poi_notification_id(poi.id),
        title: "POITracker: Near POI.".to_owned(),
        body: format!("Welcome to {} ({})!", poi.name, poi.category),
    }
}
