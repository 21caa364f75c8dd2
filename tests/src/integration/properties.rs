//! # Property Tests
//!
//! - any sequence of mutations on a container with no subscribers ends in
//!   the same snapshot as the same sequence on a plain collection
//! - `apply_string(to_snapshot())` never changes the snapshot
//! - sorting any mix of integers and floats yields an ordered sequence

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::config;
    use autopub_sync::{compare_values, SortOrder, SyncError, SyncMap, SyncSequence};
    use futures::executor::block_on;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    #[derive(Debug, Clone)]
    enum MapStep {
        Set(String, i64),
        Delete(String),
    }

    #[derive(Debug, Clone)]
    enum SeqStep {
        SetAt(usize, i64),
        DeleteAt(usize),
        InsertAt(usize, i64),
        Push(String),
        Sort(bool),
    }

    fn key() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string)
    }

    fn map_step() -> impl Strategy<Value = MapStep> {
        prop_oneof![
            3 => (key(), any::<i64>()).prop_map(|(k, v)| MapStep::Set(k, v)),
            1 => key().prop_map(MapStep::Delete),
        ]
    }

    fn seq_step() -> impl Strategy<Value = SeqStep> {
        prop_oneof![
            (0usize..8, any::<i64>()).prop_map(|(i, v)| SeqStep::SetAt(i, v)),
            (0usize..8).prop_map(SeqStep::DeleteAt),
            (0usize..8, any::<i64>()).prop_map(|(i, v)| SeqStep::InsertAt(i, v)),
            "[a-z]{0,4}".prop_map(SeqStep::Push),
            any::<bool>().prop_map(SeqStep::Sort),
        ]
    }

    fn number() -> impl Strategy<Value = Value> {
        let two_53: u64 = 1 << 53;
        prop_oneof![
            any::<i64>().prop_map(|n| json!(n)),
            any::<u64>().prop_map(|n| json!(n)),
            (-1e20f64..1e20).prop_map(|f| json!(f)),
            (0..16_u64).prop_map(move |k| json!(two_53 + k)),
            (0..16_u64).prop_map(move |k| json!((two_53 + k) as f64)),
            (0..16_u64).prop_map(|k| json!(u64::MAX - k)),
            (0..16_u64).prop_map(|k| json!((u64::MAX - k) as f64)),
        ]
    }

    /// Plain ordered map: keeps insertion order, removal shifts later keys.
    fn reference_map(steps: &[MapStep]) -> String {
        let mut entries: Vec<(String, Value)> = Vec::new();
        for step in steps {
            match step {
                MapStep::Set(k, v) => match entries.iter_mut().find(|(key, _)| key == k) {
                    Some(entry) => entry.1 = json!(v),
                    None => entries.push((k.clone(), json!(v))),
                },
                MapStep::Delete(k) => entries.retain(|(key, _)| key != k),
            }
        }
        let object: serde_json::Map<String, Value> = entries.into_iter().collect();
        serde_json::to_string(&object).unwrap()
    }

    fn reference_sequence(steps: &[SeqStep]) -> Vec<Value> {
        let mut items: Vec<Value> = Vec::new();
        for step in steps {
            match step {
                SeqStep::SetAt(i, v) => {
                    if let Some(item) = items.get_mut(*i) {
                        *item = json!(v);
                    }
                }
                SeqStep::DeleteAt(i) => {
                    if *i < items.len() {
                        items.remove(*i);
                    }
                }
                SeqStep::InsertAt(i, v) => items.insert((*i).min(items.len()), json!(v)),
                SeqStep::Push(s) => items.push(json!(s)),
                SeqStep::Sort(true) => items.sort_by(compare_values),
                SeqStep::Sort(false) => items.sort_by(|a, b| compare_values(b, a)),
            }
        }
        items
    }

    fn run_map(steps: &[MapStep]) -> SyncMap {
        let map = SyncMap::new(config("prop")).unwrap();
        block_on(async {
            for step in steps {
                match step {
                    MapStep::Set(k, v) => {
                        map.set(k.as_str(), v).await.unwrap();
                    }
                    MapStep::Delete(k) => match map.delete(k).await {
                        Ok(_) | Err(SyncError::KeyNotFound { .. }) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    },
                }
            }
        });
        map
    }

    fn run_sequence(steps: &[SeqStep]) -> SyncSequence {
        let list = SyncSequence::new(config("prop")).unwrap();
        block_on(async {
            for step in steps {
                let outcome = match step {
                    SeqStep::SetAt(i, v) => list.set_at(*i, v).await.map(|_| ()),
                    SeqStep::DeleteAt(i) => list.delete_at(*i).await.map(|_| ()),
                    SeqStep::InsertAt(i, v) => list.insert_at(*i, v).await,
                    SeqStep::Push(s) => list.push(s.as_str()).await,
                    SeqStep::Sort(true) => list.sort(SortOrder::Ascending).await,
                    SeqStep::Sort(false) => list.sort(SortOrder::Descending).await,
                };
                match outcome {
                    Ok(()) | Err(SyncError::IndexOutOfRange { .. }) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
        });
        list
    }

    proptest! {
        #[test]
        fn prop_map_matches_reference(steps in prop::collection::vec(map_step(), 0..40)) {
            let map = run_map(&steps);
            prop_assert_eq!(map.to_snapshot().unwrap(), reference_map(&steps));
        }

        #[test]
        fn prop_sequence_matches_reference(steps in prop::collection::vec(seq_step(), 0..40)) {
            let list = run_sequence(&steps);
            prop_assert_eq!(list.to_vec(), reference_sequence(&steps));
        }

        #[test]
        fn prop_map_snapshot_round_trip(steps in prop::collection::vec(map_step(), 0..40)) {
            let map = run_map(&steps);
            let before = map.to_snapshot().unwrap();
            block_on(map.apply_string(&before)).unwrap();
            prop_assert_eq!(map.to_snapshot().unwrap(), before);
        }

        #[test]
        fn prop_sort_mixed_numbers_is_ordered(items in prop::collection::vec(number(), 0..64)) {
            let list = SyncSequence::with_items(items, config("numbers")).unwrap();
            block_on(list.sort(SortOrder::Ascending)).unwrap();
            let sorted = list.to_vec();
            prop_assert!(sorted.windows(2).all(|pair| compare_values(&pair[0], &pair[1]).is_le()));
        }

        #[test]
        fn prop_sequence_snapshot_round_trip(steps in prop::collection::vec(seq_step(), 0..40)) {
            let list = run_sequence(&steps);
            let before = list.to_snapshot().unwrap();
            let copy = SyncSequence::from_snapshot(&before, config("copy")).unwrap();
            prop_assert_eq!(copy.to_snapshot().unwrap(), before);
        }
    }
}
