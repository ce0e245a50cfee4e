/// Returns early with `ErrorKind::IndexOutOfBounds` unless `index < len`.
///
/// The enclosing function must return `Result<_, ratepack_common::error::Error>`.
#[macro_export]
macro_rules! verify_index {
    ($index:expr, $len:expr) => {{
        let (index, len) = ($index, $len);
        if index >= len {
            return Err($crate::error::Error::out_of_bounds(index, len));
        }
    }};
}
