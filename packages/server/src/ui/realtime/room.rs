//! Live membership of one tip room.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Duration,
};

use tokio::time::Instant;

use crate::domain::TipId;

use super::connection::{Connection, ConnectionId};

/// The set of connections sharing a tip id.
///
/// Lock order is always `members` then `last_activity`. Neither lock is held
/// across an await or a socket write; fan-out goes through the non-blocking
/// [`Connection::enqueue`].
pub struct Room {
    tip_id: TipId,
    members: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
    last_activity: Mutex<Instant>,
    idle_threshold: Duration,
}

impl Room {
    pub fn new(tip_id: TipId, idle_threshold: Duration) -> Self {
        Self {
            tip_id,
            members: RwLock::new(HashMap::new()),
            last_activity: Mutex::new(Instant::now()),
            idle_threshold,
        }
    }

    pub fn tip_id(&self) -> &TipId {
        &self.tip_id
    }

    /// Add a member. Re-joining an existing member only refreshes activity.
    pub fn join(&self, conn: Arc<Connection>) {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        members.entry(conn.id()).or_insert(conn);
        self.touch();
    }

    /// Remove a member if present and close its socket.
    pub fn leave(&self, conn: &Connection) {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        members.remove(&conn.id());
        conn.close();
        self.touch();
    }

    /// Offer `frame` to every current member.
    ///
    /// Members with a full queue miss the frame. Returns how many members
    /// accepted it.
    pub fn broadcast(&self, frame: &str) -> usize {
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        self.touch();
        members
            .values()
            .filter(|conn| conn.enqueue(frame.to_string()))
            .count()
    }

    /// Evict every member if the room has been silent longer than the idle
    /// threshold. Returns the number of evicted connections.
    ///
    /// Activity is tracked per room (joins, leaves, broadcasts), so a quiet
    /// but healthy client is evicted along with the rest.
    pub fn check_idle(&self) -> usize {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        if self.idle_for() <= self.idle_threshold {
            return 0;
        }

        let evicted = members.len();
        for (_, conn) in members.drain() {
            conn.close();
        }
        if evicted > 0 {
            tracing::info!(tip_id = %self.tip_id, evicted, "evicted members of idle room");
        }
        evicted
    }

    pub fn is_empty(&self) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn len(&self) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Time elapsed since the last join, leave, or broadcast.
    pub fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }
}
