use std::sync::Arc;

use artifacts::{ArtifactClient, MemoryStore};
use rand::{Rng, SeedableRng, rngs::StdRng};

pub const HEADER: &str = "longitude,latitude,housing_median_age,total_rooms,total_bedrooms,population,households,median_income,median_house_value,ocean_proximity";

const PROXIMITY: [&str; 4] = ["NEAR BAY", "<1H OCEAN", "INLAND", "NEAR OCEAN"];

/// A synthetic California housing extract.
///
/// Every `missing_every`-th row has an empty `total_bedrooms`.
pub fn housing_csv(rows: usize, missing_every: usize) -> String {
    let mut rng = StdRng::seed_from_u64(7);
    let mut csv = format!("{HEADER}\n");

    for i in 0..rows {
        let longitude: f64 = rng.random_range(-124.0..-114.0);
        let latitude: f64 = rng.random_range(32.5..42.0);
        let age: f64 = rng.random_range(1.0..52.0_f64).round();
        let rooms: f64 = rng.random_range(200.0..6000.0_f64).round();
        let bedrooms = (rooms * rng.random_range(0.15..0.3)).round();
        let population: f64 = rng.random_range(100.0..4000.0_f64).round();
        let households = (population / rng.random_range(2.0..4.0)).round();
        let income: f64 = rng.random_range(0.5..15.0);
        let noise: f64 = rng.random_range(-15_000.0..15_000.0);

        let value = 40_000.0 * income - 2_500.0 * (latitude - 32.5) + 900.0 * age
            + 12.0 * rooms
            - 30.0 * population
            + noise;

        let bedrooms = if missing_every > 0 && i % missing_every == 0 {
            String::new()
        } else {
            format!("{bedrooms:.1}")
        };

        csv.push_str(&format!(
            "{longitude:.2},{latitude:.2},{age:.1},{rooms:.1},{bedrooms},{population:.1},{households:.1},{income:.4},{value:.1},{}\n",
            PROXIMITY[i % PROXIMITY.len()]
        ));
    }

    csv
}

pub fn memory_client() -> (Arc<MemoryStore>, ArtifactClient) {
    let store = Arc::new(MemoryStore::new());
    let client = ArtifactClient::new(store.clone());
    (store, client)
}

/// Test-side emptiness check for `MemoryStore`, answered through `ArtifactStore::list`.
pub trait StoreExt {
    fn is_empty(&self) -> bool;
}

impl StoreExt for MemoryStore {
    fn is_empty(&self) -> bool {
        use artifacts::ArtifactStore;
        use std::future::Future;
        use std::task::{Context, Poll, Waker};

        // `MemoryStore::list` never suspends, so a single poll resolves it.
        let mut list = std::pin::pin!(self.list(""));
        match list.as_mut().poll(&mut Context::from_waker(Waker::noop())) {
            Poll::Ready(keys) => keys.expect("list memory store").is_empty(),
            Poll::Pending => panic!("MemoryStore::list suspended"),
        }
    }
}
