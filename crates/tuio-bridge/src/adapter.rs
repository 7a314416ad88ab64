//! Entity adapters: decoder callbacks in, point events out.

use std::sync::Arc;

use tuio_bridge_bus::{EventBus, PointEvent};
use tuio_bridge_protocol::{EntityKind, RawEntity};
use tuio_bridge_registry::Point;

use crate::config::CoordinateConvention;
use crate::decoder::EntityHandler;

/// Translates one entity kind's callbacks into [`PointEvent`]s.
///
/// Every callback produces exactly one event, published synchronously on
/// the caller's context. Ids and coordinates are not validated.
pub struct EntityAdapter {
    kind: EntityKind,
    convention: CoordinateConvention,
    bus: Arc<EventBus>,
}

impl EntityAdapter {
    pub fn new(
        kind: EntityKind,
        convention: CoordinateConvention,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            kind,
            convention,
            bus,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn point(&self, entity: &RawEntity) -> Arc<Point> {
        Arc::new(Point::new(
            self.kind,
            entity.id,
            self.convention.apply(entity.x, entity.y),
        ))
    }
}

impl EntityHandler for EntityAdapter {
    fn entity_added(&self, entity: &RawEntity) {
        self.bus.publish(PointEvent::Added(self.point(entity)));
    }

    fn entity_updated(&self, entity: &RawEntity) {
        self.bus.publish(PointEvent::Updated(self.point(entity)));
    }

    fn entity_removed(&self, entity: &RawEntity) {
        self.bus.publish(PointEvent::Removed(self.point(entity)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_bridge_bus::PointEventKind;
    use tuio_bridge_registry::{PointRegistry, Position};

    fn adapter(kind: EntityKind, convention: CoordinateConvention) -> (EntityAdapter, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new(Arc::new(PointRegistry::default())));
        (EntityAdapter::new(kind, convention, Arc::clone(&bus)), bus)
    }

    #[test]
    fn test_entity_added_flips_y_for_bottom_left() {
        let (adapter, bus) = adapter(EntityKind::Cursor, CoordinateConvention::BottomLeft);
        let mut feed = bus.subscribe();

        adapter.entity_added(&RawEntity::new(4, 0.25, 0.10));

        let event = feed.try_recv().unwrap();
        assert_eq!(event.kind(), PointEventKind::Added);
        let point = event.point();
        assert_eq!(point.kind(), EntityKind::Cursor);
        assert_eq!(point.id(), 4);
        let p = point.position();
        assert!((p.x - 0.25).abs() < 1e-6 && (p.y - 0.90).abs() < 1e-6, "got {p}");
    }

    #[test]
    fn test_entity_updated_top_left_keeps_y() {
        let (adapter, bus) = adapter(EntityKind::Object, CoordinateConvention::TopLeft);
        let mut feed = bus.subscribe();

        adapter.entity_updated(&RawEntity::new(1, 0.25, 0.10));

        let event = feed.try_recv().unwrap();
        assert_eq!(event.kind(), PointEventKind::Updated);
        assert_eq!(event.point().position(), Position::new(0.25, 0.10));
    }

    #[test]
    fn test_each_callback_publishes_one_event() {
        let (adapter, bus) = adapter(EntityKind::Blob, CoordinateConvention::BottomLeft);
        let mut feed = bus.subscribe();
        let blob = RawEntity::new(9, 0.5, 0.5);

        adapter.entity_added(&blob);
        adapter.entity_updated(&blob);
        adapter.entity_removed(&blob);

        let kinds: Vec<_> = feed.drain().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![PointEventKind::Added, PointEventKind::Updated, PointEventKind::Removed]
        );
        assert!(bus.registry().is_empty());
    }

    #[test]
    fn test_negative_id_passes_through() {
        let (adapter, bus) = adapter(EntityKind::Cursor, CoordinateConvention::BottomLeft);

        adapter.entity_added(&RawEntity::new(-1, 0.0, 0.0));

        assert_eq!(bus.registry().snapshot()[0].id(), -1);
    }
}
