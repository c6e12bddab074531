//! Seed snaps present at startup

use wsr_common::{GeoPoint, Snap, SnapId};

struct SeedSnap {
    id: &'static str,
    image_url: &'static str,
    latitude: f64,
    longitude: f64,
    location_name: &'static str,
    caption: &'static str,
    sender_name: &'static str,
    age_ms: i64,
}

const SEEDS: [SeedSnap; 3] = [
    SeedSnap {
        id: "1",
        image_url: "https://images.unsplash.com/photo-1540959733332-eab4deabeeaf?auto=format&fit=crop&w=800&q=80",
        latitude: 35.6762,
        longitude: 139.6503,
        location_name: "Tokio, Japan",
        caption: "Neonlichten en drukke straten in het hart van de stad.",
        sender_name: "Hiroshi",
        age_ms: 3_600_000,
    },
    SeedSnap {
        id: "2",
        image_url: "https://images.unsplash.com/photo-1483728642387-6c3bdd6c93e5?auto=format&fit=crop&w=800&q=80",
        latitude: -22.9068,
        longitude: -43.1729,
        location_name: "Rio de Janeiro, Brazilië",
        caption: "De zon zakt langzaam achter de bergen.",
        sender_name: "Ananda",
        age_ms: 7_200_000,
    },
    SeedSnap {
        id: "3",
        image_url: "https://images.unsplash.com/photo-1502602898657-3e91760cbb34?auto=format&fit=crop&w=800&q=80",
        latitude: 48.8566,
        longitude: 2.3522,
        location_name: "Parijs, Frankrijk",
        caption: "Bonjour vanuit de stad van de liefde.",
        sender_name: "Julie",
        age_ms: 100_000,
    },
];

/// The three seed snaps, in feed order, timestamped relative to `now_ms`
pub fn seed_snaps(now_ms: i64) -> Vec<Snap> {
    SEEDS
        .iter()
        .map(|s| {
            Snap::new(
                SnapId::new(s.id),
                s.image_url,
                GeoPoint::clamped(s.latitude, s.longitude),
                s.sender_name,
                now_ms - s.age_ms,
            )
            .with_location_name(s.location_name)
            .with_caption(s.caption)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_are_valid_and_ordered() {
        let snaps = seed_snaps(10_000_000);
        let ids: Vec<&str> = snaps.iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        for (snap, seed) in snaps.iter().zip(SEEDS.iter()) {
            // Coordinates survive unclamped
            assert_eq!(snap.latitude(), seed.latitude);
            assert_eq!(snap.longitude(), seed.longitude);
        }

        assert_eq!(snaps[0].location_name(), Some("Tokio, Japan"));
        assert_eq!(snaps[2].sender_name(), "Julie");
        assert_eq!(snaps[1].timestamp(), 10_000_000 - 7_200_000);
    }
}
