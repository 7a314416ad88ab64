//! The point registry: every point currently on the sensing surface.
//!
//! The registry is written from the decoder's background context and read
//! from the consumer's loop, so the map sits behind one
//! `parking_lot::Mutex`. Every operation is O(1) (snapshot is O(n)) and
//! never blocks on I/O while holding the lock.
//!
//! None of the mutators fail. Protocol churn routinely produces a
//! duplicate add, or an update racing a remove; those are absorbed as
//! no-ops instead of surfacing as errors.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tuio_bridge_protocol::EntityKind;

use crate::Point;

// ---------------------------------------------------------------------------
// IdentityPolicy
// ---------------------------------------------------------------------------

/// How the registry derives a key from a point.
///
/// The protocol numbers blobs, cursors and objects independently, so the
/// same numeric id can be live in two kinds at once.
///
/// - **NumericId** (default): key on `id` alone. A `Blob#7` and a
///   `Cursor#7` collide: whichever was added first owns the slot, the
///   later add is ignored, and updates/removes for id 7 of *either* kind
///   address the stored point.
/// - **KindAndId**: key on `(kind, id)`. Kinds never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdentityPolicy {
    #[default]
    NumericId,
    KindAndId,
}

impl IdentityPolicy {
    /// Builds the registry key for a point of `kind` with `id`.
    pub fn key(self, kind: EntityKind, id: i32) -> RegistryKey {
        match self {
            Self::NumericId => RegistryKey::Id(id),
            Self::KindAndId => RegistryKey::KindAndId(kind, id),
        }
    }
}

/// A registry map key, as produced by [`IdentityPolicy::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKey {
    Id(i32),
    KindAndId(EntityKind, i32),
}

// ---------------------------------------------------------------------------
// PointRegistry
// ---------------------------------------------------------------------------

struct Inner {
    points: HashMap<RegistryKey, Arc<Point>>,
    /// Set once by `close()`. Mutations after that are ignored.
    closed: bool,
}

/// Thread-safe mapping from identity to the live [`Point`] handle.
///
/// ## Lifecycle of one entry
///
/// ```text
/// upsert_add() ──→ apply_update()* ──→ remove()
///      │                 │                │
///      ▼                 ▼                ▼
///  [inserted]     [moved in place]    [gone]
/// ```
pub struct PointRegistry {
    policy: IdentityPolicy,
    inner: Mutex<Inner>,
}

impl PointRegistry {
    pub fn new(policy: IdentityPolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(Inner {
                points: HashMap::new(),
                closed: false,
            }),
        }
    }

    pub fn policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// Inserts `point` if its key is absent.
    ///
    /// First writer wins: if the key is taken, the stored point is kept and
    /// the call is a no-op. Returns `true` if the point was inserted.
    pub fn upsert_add(&self, point: Arc<Point>) -> bool {
        let key = self.policy.key(point.kind(), point.id());
        let mut inner = self.inner.lock();
        if inner.closed {
            tracing::trace!(%point, "registry closed, ignoring add");
            return false;
        }
        if let Some(existing) = inner.points.get(&key) {
            tracing::warn!(
                id = point.id(),
                kind = %point.kind(),
                existing_kind = %existing.kind(),
                "point id already registered, ignoring add"
            );
            return false;
        }
        inner.points.insert(key, point);
        true
    }

    /// Moves the stored point with `point`'s key to `point`'s position.
    ///
    /// The stored handle is mutated in place, so earlier holders of it see
    /// the move. Returns `false` (and does nothing) if the key is absent.
    pub fn apply_update(&self, point: &Point) -> bool {
        let key = self.policy.key(point.kind(), point.id());
        let inner = self.inner.lock();
        if inner.closed {
            return false;
        }
        match inner.points.get(&key) {
            Some(stored) => {
                stored.set_position(point.position());
                true
            }
            None => {
                tracing::trace!(%point, "update for unknown point, ignoring");
                false
            }
        }
    }

    /// Removes the point keyed by `(kind, id)`.
    ///
    /// Under [`IdentityPolicy::NumericId`] `kind` does not take part in the
    /// lookup. Returns the removed handle, or `None` if nothing matched.
    pub fn remove(&self, kind: EntityKind, id: i32) -> Option<Arc<Point>> {
        let key = self.policy.key(kind, id);
        let mut inner = self.inner.lock();
        if inner.closed {
            return None;
        }
        inner.points.remove(&key)
    }

    /// Looks up the live handle for `(kind, id)`.
    pub fn get(&self, kind: EntityKind, id: i32) -> Option<Arc<Point>> {
        let key = self.policy.key(kind, id);
        self.inner.lock().points.get(&key).cloned()
    }

    /// Returns the current points as an independent list.
    ///
    /// The list is a copy taken under the lock, so it is one consistent
    /// registry state. Order is unspecified. The handles themselves are
    /// live: a later update moves them.
    pub fn snapshot(&self) -> Vec<Arc<Point>> {
        self.inner.lock().points.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().points.is_empty()
    }

    /// Clears the registry and rejects every later mutation.
    ///
    /// Clearing and closing happen under one lock acquisition, so a
    /// concurrent mutation lands either before (and is then cleared) or
    /// after (and is ignored). Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        let dropped = inner.points.len();
        inner.points.clear();
        tracing::debug!(dropped, "point registry closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::new(IdentityPolicy::default())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `PointRegistry`.
    //!
    //! Naming: `test_{function}_{scenario}_{expected}`.

    use super::*;
    use crate::Position;

    // -- Helpers ----------------------------------------------------------

    fn point(kind: EntityKind, id: i32, x: f32, y: f32) -> Arc<Point> {
        Arc::new(Point::new(kind, id, Position::new(x, y)))
    }

    fn cursor(id: i32, x: f32, y: f32) -> Arc<Point> {
        point(EntityKind::Cursor, id, x, y)
    }

    // =====================================================================
    // upsert_add()
    // =====================================================================

    #[test]
    fn test_upsert_add_new_point_inserts() {
        let reg = PointRegistry::default();

        assert!(reg.upsert_add(cursor(1, 0.1, 0.2)));

        assert_eq!(reg.len(), 1);
        let stored = reg.get(EntityKind::Cursor, 1).expect("should be stored");
        assert_eq!(stored.position(), Position::new(0.1, 0.2));
    }

    #[test]
    fn test_upsert_add_duplicate_keeps_first_position() {
        let reg = PointRegistry::default();
        reg.upsert_add(cursor(1, 0.1, 0.1));

        let inserted = reg.upsert_add(cursor(1, 0.9, 0.9));

        assert!(!inserted, "second add should be a no-op");
        assert_eq!(reg.len(), 1);
        assert_eq!(
            reg.get(EntityKind::Cursor, 1).unwrap().position(),
            Position::new(0.1, 0.1),
            "first writer wins"
        );
    }

    #[test]
    fn test_upsert_add_stores_the_given_handle() {
        let reg = PointRegistry::default();
        let handle = cursor(2, 0.5, 0.5);

        reg.upsert_add(Arc::clone(&handle));
        reg.apply_update(&Point::new(EntityKind::Cursor, 2, Position::new(0.7, 0.3)));

        // The caller's handle is the stored one, so it sees the move.
        assert_eq!(handle.position(), Position::new(0.7, 0.3));
    }

    // =====================================================================
    // apply_update() / remove() on unknown ids
    // =====================================================================

    #[test]
    fn test_apply_update_unknown_id_is_noop() {
        let reg = PointRegistry::default();
        reg.upsert_add(cursor(1, 0.1, 0.1));

        let updated = reg.apply_update(&cursor(99, 0.5, 0.5));

        assert!(!updated);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(EntityKind::Cursor, 99).is_none());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let reg = PointRegistry::default();
        reg.upsert_add(cursor(1, 0.1, 0.1));

        assert!(reg.remove(EntityKind::Cursor, 42).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_twice_second_is_noop() {
        let reg = PointRegistry::default();
        reg.upsert_add(cursor(1, 0.1, 0.1));

        assert!(reg.remove(EntityKind::Cursor, 1).is_some());
        assert!(reg.remove(EntityKind::Cursor, 1).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_update_after_remove_does_not_resurrect() {
        let reg = PointRegistry::default();
        reg.upsert_add(cursor(1, 0.1, 0.1));
        reg.remove(EntityKind::Cursor, 1);

        reg.apply_update(&cursor(1, 0.4, 0.4));

        assert!(reg.is_empty());
    }

    // =====================================================================
    // Ordered lifecycle with snapshots in between
    // =====================================================================

    #[test]
    fn test_lifecycle_add_update_update_remove_snapshots_follow() {
        let reg = PointRegistry::default();

        reg.upsert_add(cursor(5, 0.0, 0.0));
        reg.apply_update(&cursor(5, 0.1, 0.1));
        let s1 = reg.snapshot();
        assert_eq!(s1.len(), 1);
        let p1 = s1[0].position();

        reg.apply_update(&cursor(5, 0.2, 0.2));
        let s2 = reg.snapshot();
        assert_eq!(s2.len(), 1);

        reg.remove(EntityKind::Cursor, 5);
        let s3 = reg.snapshot();

        assert_eq!(p1, Position::new(0.1, 0.1));
        assert_eq!(s2[0].position(), Position::new(0.2, 0.2));
        assert!(s3.is_empty());
    }

    #[test]
    fn test_snapshot_list_is_independent_of_later_inserts() {
        let reg = PointRegistry::default();
        reg.upsert_add(cursor(1, 0.1, 0.1));
        let snap = reg.snapshot();

        reg.upsert_add(cursor(2, 0.2, 0.2));
        reg.remove(EntityKind::Cursor, 1);

        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id(), 1);
    }

    // =====================================================================
    // Cross-kind identity
    // =====================================================================

    #[test]
    fn test_numeric_id_same_id_different_kind_collides() {
        // Default policy keys on the id alone: Cursor#7 is shadowed by the
        // Blob#7 that arrived first.
        let reg = PointRegistry::new(IdentityPolicy::NumericId);
        reg.upsert_add(point(EntityKind::Blob, 7, 0.1, 0.1));

        let inserted = reg.upsert_add(point(EntityKind::Cursor, 7, 0.9, 0.9));

        assert!(!inserted);
        let snap = reg.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].kind(), EntityKind::Blob);
    }

    #[test]
    fn test_numeric_id_update_and_remove_cross_kinds() {
        let reg = PointRegistry::new(IdentityPolicy::NumericId);
        reg.upsert_add(point(EntityKind::Blob, 7, 0.1, 0.1));

        // A cursor update with the same id moves the stored blob...
        reg.apply_update(&Point::new(EntityKind::Cursor, 7, Position::new(0.5, 0.5)));
        assert_eq!(
            reg.get(EntityKind::Blob, 7).unwrap().position(),
            Position::new(0.5, 0.5)
        );

        // ...and a cursor remove deletes it.
        let removed = reg.remove(EntityKind::Cursor, 7).expect("should remove");
        assert_eq!(removed.kind(), EntityKind::Blob);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_kind_and_id_same_id_different_kind_coexist() {
        let reg = PointRegistry::new(IdentityPolicy::KindAndId);
        reg.upsert_add(point(EntityKind::Blob, 7, 0.1, 0.1));

        assert!(reg.upsert_add(point(EntityKind::Cursor, 7, 0.9, 0.9)));
        assert_eq!(reg.len(), 2);

        reg.remove(EntityKind::Cursor, 7);
        let snap = reg.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].kind(), EntityKind::Blob);
    }

    #[test]
    fn test_kind_and_id_update_does_not_cross_kinds() {
        let reg = PointRegistry::new(IdentityPolicy::KindAndId);
        reg.upsert_add(point(EntityKind::Object, 3, 0.1, 0.1));

        assert!(!reg.apply_update(&Point::new(
            EntityKind::Cursor,
            3,
            Position::new(0.8, 0.8)
        )));
        assert_eq!(
            reg.get(EntityKind::Object, 3).unwrap().position(),
            Position::new(0.1, 0.1)
        );
    }

    #[test]
    fn test_identity_policy_default_is_numeric_id() {
        assert_eq!(IdentityPolicy::default(), IdentityPolicy::NumericId);
        assert_eq!(PointRegistry::default().policy(), IdentityPolicy::NumericId);
    }

    #[test]
    fn test_identity_policy_serializes_by_variant_name() {
        let json = serde_json::to_string(&IdentityPolicy::KindAndId).unwrap();
        assert_eq!(json, "\"KindAndId\"");
    }

    // =====================================================================
    // close()
    // =====================================================================

    #[test]
    fn test_close_clears_and_rejects_later_mutations() {
        let reg = PointRegistry::default();
        reg.upsert_add(cursor(1, 0.1, 0.1));

        reg.close();

        assert!(reg.is_closed());
        assert!(reg.snapshot().is_empty());
        assert!(!reg.upsert_add(cursor(2, 0.2, 0.2)));
        assert!(!reg.apply_update(&cursor(1, 0.3, 0.3)));
        assert!(reg.remove(EntityKind::Cursor, 1).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_close_twice_is_noop() {
        let reg = PointRegistry::default();
        reg.close();
        reg.close();
        assert!(reg.is_closed());
    }
}
