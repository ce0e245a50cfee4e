pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Returns early with `ErrorKind::InvalidArgument` unless `$expr` holds. The argument
/// name and the failed condition are recorded as written.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        if !$expr {
            return Err($crate::result::failed_check(
                $crate::result::Check::Argument,
                stringify!($name),
                stringify!($expr),
            ));
        }
    }};
}

/// Returns early with `ErrorKind::InvalidFormat` unless `$expr` holds. Used while
/// parsing file contents; the resulting error is a load error.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        if !$expr {
            return Err($crate::result::failed_check(
                $crate::result::Check::Data,
                stringify!($name),
                stringify!($expr),
            ));
        }
    }};
}

/// What a failed `verify_*` check was guarding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Check {
    Argument,
    Data,
}

/// Builds the error for a failed check. `name` may be a quoted literal.
#[cold]
pub fn failed_check(check: Check, name: &str, condition: &str) -> crate::error::Error {
    let name = name.trim_matches('"');
    let message = format!("expected {condition}");
    match check {
        Check::Argument => crate::error::Error::invalid_arg(name, message),
        Check::Data => crate::error::Error::invalid_format(name, message),
    }
}
