//! Process-wide registry of tip rooms.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::domain::TipId;

use super::{RealtimeConfig, connection::Connection, room::Room};

/// Owns every live [`Room`], keyed by tip id.
///
/// Rooms are created lazily and only removed by [`Hub::sweep`], never on the
/// last leave, so a client reconnecting quickly lands in the same room.
pub struct Hub {
    rooms: Mutex<HashMap<TipId, Arc<Room>>>,
    config: RealtimeConfig,
}

impl Hub {
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Return the room for `tip_id`, creating it on first use.
    pub fn get_or_create_room(&self, tip_id: &TipId) -> Arc<Room> {
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        self.entry(&mut rooms, tip_id)
    }

    /// Look up an existing room without creating one.
    pub fn room(&self, tip_id: &TipId) -> Option<Arc<Room>> {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tip_id)
            .cloned()
    }

    /// Join `conn` to the room of its tip id.
    ///
    /// Lookup and join happen under the registry lock so a concurrent sweep
    /// cannot reap the room in between.
    pub fn join_room(&self, conn: Arc<Connection>) -> Arc<Room> {
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let room = self.entry(&mut rooms, conn.tip_id());
        room.join(conn);
        room
    }

    pub fn room_count(&self) -> usize {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// One reclamation pass: evict members of idle rooms, then drop every
    /// room left empty. Returns the number of rooms removed.
    pub fn sweep(&self) -> usize {
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let before = rooms.len();
        rooms.retain(|_, room| {
            room.check_idle();
            !room.is_empty()
        });
        before - rooms.len()
    }

    /// Sweep forever at the configured interval.
    ///
    /// Meant to be spawned once at startup; it stops only with the runtime.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.sweep_interval);
        // the first tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let reaped = self.sweep();
            tracing::info!(reaped, remaining = self.room_count(), "hub sweep finished");
        }
    }

    fn entry(&self, rooms: &mut HashMap<TipId, Arc<Room>>, tip_id: &TipId) -> Arc<Room> {
        rooms
            .entry(tip_id.clone())
            .or_insert_with(|| {
                tracing::info!(tip_id = %tip_id, "room created");
                Arc::new(Room::new(tip_id.clone(), self.config.room_idle_threshold))
            })
            .clone()
    }
}
