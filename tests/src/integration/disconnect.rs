//! # Disconnect Handling
//!
//! Subscribers are held weakly; the router's disconnect listener removes a
//! peer explicitly.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{config, join, recording};
    use autopub_bus::InMemoryRouter;
    use autopub_sync::{SyncError, SyncMap};
    use autopub_types::PeerId;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_disconnect_listener_drops_subscriber() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);
        let (b_link, b_session) = join(&router);

        let authority = SyncMap::new(config("scores")).unwrap();
        let replica = SyncMap::new(config("scores")).unwrap();
        authority.join_as_authority(&a_session).await.unwrap();
        replica.join_as_replica(&b_session).await.unwrap();

        let hook = replica.clone();
        router.add_disconnect_listener(Arc::new(move |peer: PeerId| {
            hook.peer_disconnected(&peer);
        }));

        b_link.close();

        assert!(replica.subscribers().is_empty());
        assert!(!router.is_connected(b_session.peer_id()));
        // Local mutations keep working with nobody to publish to
        replica.set("offline", &true).await.unwrap();
        assert_eq!(replica.metrics().publish_failures, 0);
        // Joined state never reverts
        assert!(replica.is_connected());
    }

    #[tokio::test]
    async fn test_dropped_session_is_not_kept_alive() {
        let map = SyncMap::new(config("scores")).unwrap();
        let (link, session) = recording();
        map.subscribe(&session);
        assert_eq!(map.subscribers().len(), 1);

        drop(link);
        drop(session);

        assert!(map.subscribers().is_empty());
        map.set("k", &1).await.unwrap();
        assert_eq!(map.metrics().events_published, 0);
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let map = SyncMap::new(config("scores")).unwrap();
        let (link, session) = recording();
        map.subscribe(&session);

        map.unsubscribe(&session.peer_id()).unwrap();
        map.set("k", &1).await.unwrap();

        assert_eq!(link.publish_count(), 0);
        assert!(matches!(
            map.unsubscribe(&session.peer_id()),
            Err(SyncError::NotSubscribed { .. })
        ));
    }
}
