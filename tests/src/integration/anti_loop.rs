//! # Anti-Loop
//!
//! A local mutation publishes exactly once; the receiving side replays it
//! with propagation closed and publishes nothing.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{config, join, recording};
    use autopub_bus::InMemoryRouter;
    use autopub_sync::{SyncMap, SyncSequence};
    use serde_json::json;

    #[tokio::test]
    async fn test_mutation_publishes_once_and_replay_publishes_nothing() {
        let a = SyncMap::new(config("scores")).unwrap();
        let b = SyncMap::new(config("scores")).unwrap();
        let (a_link, a_session) = recording();
        let (b_link, b_session) = recording();
        a.subscribe(&a_session);
        b.subscribe(&b_session);

        a.set("alice", &5).await.unwrap();

        let events = a_link.published();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        b.on_remote_event(event.args.clone(), &event.metadata)
            .await
            .unwrap();

        assert_eq!(b.get("alice"), Some(json!(5)));
        assert_eq!(b_link.publish_count(), 0);
        assert!(b.is_propagating());
    }

    #[tokio::test]
    async fn test_router_round_trip_does_not_echo() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);
        let (_b_link, b_session) = join(&router);

        let authority = SyncSequence::new(config("list")).unwrap();
        let replica = SyncSequence::new(config("list")).unwrap();
        authority.join_as_authority(&a_session).await.unwrap();
        replica.join_as_replica(&b_session).await.unwrap();

        let before = router.events_published();
        authority.push("from-a").await.unwrap();
        assert_eq!(router.events_published(), before + 1);

        replica.push("from-b").await.unwrap();
        assert_eq!(router.events_published(), before + 2);

        assert_eq!(authority.to_vec(), vec![json!("from-a"), json!("from-b")]);
        assert_eq!(replica.to_vec(), authority.to_vec());
        assert_eq!(authority.metrics().events_replayed, 1);
        assert_eq!(replica.metrics().events_replayed, 1);
    }

    #[tokio::test]
    async fn test_full_state_broadcast_replays_without_echo() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);
        let (_b_link, b_session) = join(&router);

        let authority = SyncMap::new(config("scores")).unwrap();
        let replica = SyncMap::new(config("scores")).unwrap();
        authority.join_as_authority(&a_session).await.unwrap();
        replica.join_as_replica(&b_session).await.unwrap();

        {
            let _quiet = authority.block_propagation();
            authority.set("bulk-1", &1).await.unwrap();
            authority.set("bulk-2", &2).await.unwrap();
        }
        assert!(replica.is_empty());

        let before = router.events_published();
        authority.broadcast_sync().await.unwrap();

        assert_eq!(router.events_published(), before + 1);
        assert_eq!(replica.to_snapshot().unwrap(), authority.to_snapshot().unwrap());
    }
}
