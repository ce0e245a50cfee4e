use ratepack_common::error::ErrorKind;
use ratepack_store::{BinaryRatingStore, OpenOptions, PackOptions, SortOrder, format::HEADER_LEN};
use ratepack_testkit::{data_gen, fixtures};

fn packed() -> Vec<u8> {
    let ratings = data_gen::generate_ratings(1, 4, 6, 12, true);
    fixtures::pack_to_bytes(&ratings, PackOptions::default()).expect("pack")
}

fn open_bytes(bytes: &[u8]) -> ratepack_common::Result<BinaryRatingStore> {
    let (_dir, path) = fixtures::write_temp(bytes).expect("write");
    BinaryRatingStore::open(&path)
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BinaryRatingStore::open(dir.path().join("nope.bin")).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err.kind(), ErrorKind::FileNotFound { .. }));
}

#[test]
fn test_empty_file() {
    assert!(open_bytes(&[]).unwrap_err().is_load_error());
}

#[test]
fn test_truncated() {
    let bytes = packed();
    assert!(open_bytes(&bytes).is_ok());
    for len in [1, HEADER_LEN - 1, HEADER_LEN, HEADER_LEN + 40, bytes.len() - 1] {
        let err = open_bytes(&bytes[..len]).unwrap_err();
        assert!(err.is_load_error(), "len {len}: {err}");
    }
}

#[test]
fn test_trailing_bytes_ignored() {
    let ratings = fixtures::three_ratings();
    let mut bytes = fixtures::pack_to_bytes(&ratings, PackOptions::default()).unwrap();
    bytes.extend_from_slice(&[0; 8]);

    let store = open_bytes(&bytes).unwrap();
    assert_eq!(store.rating_count(), 3);
    assert_eq!(store.file_len().unwrap(), bytes.len());
    assert_eq!(store.stream_all(SortOrder::Any).unwrap().collect::<Vec<_>>(), ratings);
    assert_eq!(store.ratings_for_user(1).unwrap().unwrap().len(), 2);
}

#[test]
fn test_bad_magic() {
    let mut bytes = packed();
    bytes[2] ^= 0xFF;
    let err = open_bytes(&bytes).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidFormat { element, .. } if element == "magic"));
}

#[test]
fn test_unknown_flag() {
    let mut bytes = packed();
    bytes[6] = 0x80;
    assert!(open_bytes(&bytes).unwrap_err().is_load_error());
}

#[test]
fn test_inconsistent_counts() {
    // Rating count one lower than the rows the tables address.
    let mut bytes = packed();
    bytes[11] -= 1;
    assert!(open_bytes(&bytes).unwrap_err().is_load_error());

    // User count one higher than the keys in the table.
    let mut bytes = packed();
    bytes[15] += 1;
    assert!(open_bytes(&bytes).unwrap_err().is_load_error());
}

#[test]
fn test_repeated_row() {
    let ratings = vec![
        ratepack_store::Rating::new(1, 1, 1.0),
        ratepack_store::Rating::new(2, 1, 2.0),
    ];
    let mut bytes =
        fixtures::pack_to_bytes(&ratings, PackOptions::default().timestamps(false)).unwrap();
    // The user table (users 1 and 2, one row each) starts after two 24-byte rows.
    let users = HEADER_LEN + 48;
    let second_row = users + 16 + 8 + 4;
    assert_eq!(&bytes[second_row..second_row + 4], &1i32.to_be_bytes());
    bytes[second_row + 3] = 0;

    let (_dir, path) = fixtures::write_temp(&bytes).unwrap();
    let err = BinaryRatingStore::open(&path).unwrap_err();
    assert!(err.is_load_error());

    let lenient = OpenOptions::default().verify_row_indices(false);
    let store = BinaryRatingStore::open_with(&path, &lenient).unwrap();
    assert_eq!(store.ratings_for_user(2).unwrap().unwrap().get(0).unwrap().user, 1);
}
