use ahash::AHashMap;

use ratepack_common::error::ErrorKind;
use ratepack_keys::KeyIndex;
use ratepack_store::{
    BinaryRatingStore, EventKind, EventTypeRegistry, OpenOptions, PackOptions, Rating, SortOrder,
};
use ratepack_testkit::{data_gen, fixtures};

#[test]
fn test_three_ratings() {
    let (_dir, path) = fixtures::pack_to_temp(&fixtures::three_ratings(), PackOptions::default())
        .expect("pack");
    let store = BinaryRatingStore::open(&path).expect("open");
    assert_eq!(store.rating_count(), 3);
    assert_eq!(store.user_count(), 2);
    assert_eq!(store.item_count(), 2);

    assert_eq!(store.ratings_for_user(1).unwrap().unwrap().len(), 2);
    assert_eq!(store.ratings_for_user(2).unwrap().unwrap().len(), 1);
    assert!(store.ratings_for_user(4).unwrap().is_none());
    assert_eq!(
        store.users_for_item(2).unwrap().unwrap(),
        KeyIndex::from_keys([1, 2]).unwrap()
    );
    assert!(store.users_for_item(99).unwrap().is_none());
    assert_eq!(store.items_for_user(1).unwrap().unwrap().keys(), &[2, 3]);

    assert_eq!(store.all_user_ids().unwrap().keys(), &[1, 2]);
    assert_eq!(store.all_item_ids().unwrap().keys(), &[2, 3]);
}

#[test]
fn test_round_trip() {
    for timestamps in [true, false] {
        let ratings = data_gen::generate_ratings(11, 40, 60, 500, timestamps);
        let options = PackOptions::default().timestamps(timestamps);
        let (_dir, path) = fixtures::pack_to_temp(&ratings, options).unwrap();
        let store = BinaryRatingStore::open(&path).unwrap();

        assert_eq!(store.format().has_timestamps(), timestamps);
        let streamed = store.stream_all(SortOrder::Any).unwrap().collect::<Vec<_>>();
        assert_eq!(streamed, ratings);
    }
}

#[test]
fn test_index_consistency() {
    let ratings = data_gen::generate_ratings(5, 25, 30, 300, true);
    let (_dir, path) = fixtures::pack_to_temp(&ratings, PackOptions::default()).unwrap();
    let store = BinaryRatingStore::open(&path).unwrap();

    let mut by_user = AHashMap::<i64, Vec<Rating>>::new();
    let mut by_item = AHashMap::<i64, Vec<Rating>>::new();
    for r in &ratings {
        by_user.entry(r.user).or_default().push(*r);
        by_item.entry(r.item).or_default().push(*r);
    }
    assert_eq!(store.user_count(), by_user.len());
    assert_eq!(store.item_count(), by_item.len());

    for (user, expected) in &by_user {
        let list = store.ratings_for_user(*user).unwrap().unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), *expected);
        assert!(list.iter().all(|r| r.user == *user));
    }
    for (item, expected) in &by_item {
        let list = store.ratings_for_item(*item).unwrap().unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), *expected);
    }

    let table = store.user_table().unwrap();
    let total = table.entries().map(|(_, rows)| rows.len()).sum::<usize>();
    assert_eq!(total, store.rating_count());
    assert!(table.is_row_permutation(store.rating_count()));
}

#[test]
fn test_stream_orders() {
    let ratings = data_gen::generate_ratings(23, 15, 15, 200, true);
    let (_dir, path) = fixtures::pack_to_temp(&ratings, PackOptions::default()).unwrap();
    let store = BinaryRatingStore::open(&path).unwrap();

    let by_time = store.stream_all(SortOrder::Timestamp).unwrap();
    assert_eq!(by_time.len(), ratings.len());
    let by_time = by_time.collect::<Vec<_>>();
    assert!(by_time.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    let mut expected = ratings.clone();
    expected.sort_by_key(|r| r.timestamp);
    assert_eq!(by_time, expected);

    let by_user = store.stream_all(SortOrder::User).unwrap().collect::<Vec<_>>();
    assert!(by_user.windows(2).all(|w| w[0].user <= w[1].user));
    let mut expected = ratings.clone();
    expected.sort_by_key(|r| r.user);
    assert_eq!(by_user, expected);

    let by_item = store.stream_all(SortOrder::Item).unwrap().collect::<Vec<_>>();
    assert!(by_item.windows(2).all(|w| w[0].item <= w[1].item));
    assert_eq!(by_item.len(), ratings.len());

    // Each call starts over.
    let mut first = store.stream_all(SortOrder::Timestamp).unwrap();
    first.next();
    assert_eq!(store.stream_all(SortOrder::Timestamp).unwrap().len(), ratings.len());
}

#[test]
fn test_timestamp_order_without_timestamps() {
    let ratings = data_gen::generate_ratings(3, 5, 5, 20, false);
    let options = PackOptions::default().timestamps(false);
    let (_dir, path) = fixtures::pack_to_temp(&ratings, options).unwrap();
    let store = BinaryRatingStore::open(&path).unwrap();
    let streamed = store.stream_all(SortOrder::Timestamp).unwrap().collect::<Vec<_>>();
    assert_eq!(streamed, ratings);
}

#[test]
fn test_stream_by_user() {
    let ratings = fixtures::three_ratings();
    let (_dir, path) = fixtures::pack_to_temp(&ratings, PackOptions::default()).unwrap();
    let store = BinaryRatingStore::open(&path).unwrap();

    let histories = store.stream_by_user().unwrap();
    assert_eq!(histories.len(), 2);
    let histories = histories.collect::<Vec<_>>();
    assert_eq!(histories[0].user, 1);
    assert_eq!(histories[0].len(), 2);
    assert_eq!(
        histories[0].item_vector().unwrap().iter().collect::<Vec<_>>(),
        vec![(2, 3.5), (3, 4.0)]
    );
    assert_eq!(histories[1].user, 2);
    assert_eq!(histories[1].ratings.get(0).unwrap(), ratings[2]);
}

#[test]
fn test_rating_list_access() {
    let (_dir, path) =
        fixtures::pack_to_temp(&fixtures::three_ratings(), PackOptions::default()).unwrap();
    let store = BinaryRatingStore::open(&path).unwrap();

    let list = store.ratings_for_item(2).unwrap().unwrap();
    assert_eq!(list.row_indices().as_slice(), &[0, 2]);
    assert_eq!(list.get(1).unwrap().user, 2);
    let err = list.get(2).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::IndexOutOfBounds { index: 2, len: 2 }));
    assert_eq!((&list).into_iter().count(), 2);

    let users = list.user_vector().unwrap();
    assert_eq!(users.iter().collect::<Vec<_>>(), vec![(1, 3.5), (2, 3.0)]);
}

#[test]
fn test_latest_rating_wins() {
    let ratings = vec![
        Rating::new(1, 5, 2.0).with_timestamp(300),
        Rating::new(1, 5, 4.0).with_timestamp(100),
        Rating::new(1, 6, 1.0).with_timestamp(10),
        Rating::new(1, 6, 3.0).with_timestamp(10),
    ];
    let (_dir, path) = fixtures::pack_to_temp(&ratings, PackOptions::default()).unwrap();
    let store = BinaryRatingStore::open(&path).unwrap();
    let vector = store.ratings_for_user(1).unwrap().unwrap().item_vector().unwrap();
    assert_eq!(vector.iter().collect::<Vec<_>>(), vec![(5, 2.0), (6, 3.0)]);
}

#[test]
fn test_event_kinds() {
    let (_dir, path) =
        fixtures::pack_to_temp(&fixtures::three_ratings(), PackOptions::default()).unwrap();
    let store = BinaryRatingStore::open(&path).unwrap();
    let registry = EventTypeRegistry::with_defaults();

    let rating = registry.lookup("rating").unwrap();
    let like = registry.lookup("like").unwrap();
    assert_eq!(store.events_for_user(1, rating).unwrap().unwrap().len(), 2);
    assert!(store.events_for_user(1, like).unwrap().unwrap().is_empty());
    assert!(store.events_for_user(4, like).unwrap().is_none());
    assert!(store
        .events_for_item(3, EventKind::LikeBatch)
        .unwrap()
        .unwrap()
        .is_empty());
    assert!(store.events_for_item(7, EventKind::Rating).unwrap().is_none());
}

#[test]
fn test_close() {
    let (_dir, path) =
        fixtures::pack_to_temp(&fixtures::three_ratings(), PackOptions::default()).unwrap();
    let mut store = BinaryRatingStore::open(&path).unwrap();
    let list = store.ratings_for_user(1).unwrap().unwrap();
    let mut stream = store.stream_all(SortOrder::User).unwrap();

    store.close();
    assert!(store.is_closed());
    let err = store.ratings_for_user(1).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Closed));
    assert!(store.stream_all(SortOrder::Any).is_err());
    assert!(store.all_item_ids().is_err());
    assert_eq!(store.rating_count(), 3);
    store.close();

    assert_eq!(list.get(1).unwrap(), fixtures::three_ratings()[1]);
    assert_eq!(stream.next().unwrap().user, 1);
    assert_eq!(stream.count(), 2);
}

#[test]
fn test_concurrent_readers() {
    let ratings = data_gen::generate_ratings(8, 20, 20, 400, true);
    let (_dir, path) = fixtures::pack_to_temp(&ratings, PackOptions::default()).unwrap();
    let store =
        BinaryRatingStore::open_with(&path, &OpenOptions::default().populate(true)).unwrap();

    std::thread::scope(|s| {
        for order in [SortOrder::Any, SortOrder::Timestamp, SortOrder::User, SortOrder::Item] {
            let store = &store;
            s.spawn(move || {
                let count = store.stream_all(order).unwrap().count();
                assert_eq!(count, 400);
            });
        }
    });
}
