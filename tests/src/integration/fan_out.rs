//! # Fan-Out Failure Isolation
//!
//! A subscriber whose publish fails does not stop delivery to the others and
//! does not turn a successful mutation into an error.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{config, recording};
    use autopub_bus::BusError;
    use autopub_sync::{SyncMap, SyncSequence};
    use serde_json::json;

    #[tokio::test]
    async fn test_transport_lost_on_one_subscriber() {
        let map = SyncMap::new(config("scores")).unwrap();
        let (b, b_session) = recording();
        let (c, c_session) = recording();
        map.subscribe(&b_session);
        map.subscribe(&c_session);
        b.fail_publishes_with(BusError::TransportLost);

        let previous = map.set("alice", &1).await.unwrap();

        assert_eq!(previous, None);
        assert_eq!(map.get("alice"), Some(json!(1)));
        assert_eq!(b.publish_count(), 0);
        assert_eq!(c.publish_count(), 1);
        assert_eq!(c.published()[0].args, vec![json!("alice"), json!(1)]);

        let metrics = map.metrics();
        assert_eq!(metrics.events_published, 1);
        assert_eq!(metrics.publish_failures, 1);
    }

    #[tokio::test]
    async fn test_every_subscriber_failing_still_returns_result() {
        let list = SyncSequence::with_items(vec![json!("x")], config("list")).unwrap();
        let (b, b_session) = recording();
        list.subscribe(&b_session);
        b.fail_publishes_with(BusError::Transport("connection reset".to_string()));

        let removed = list.delete_at(0).await.unwrap();

        assert_eq!(removed, json!("x"));
        assert!(list.is_empty());
    }
}
