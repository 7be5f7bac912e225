/// Unwraps a `Result` inside a function returning `Option<Result<T, E>>`.
///
/// Yields the `Ok` value, or returns `Some(Err(e))` from the enclosing function.
/// Meant for `next()` implementations of iterators over fallible loads, e.g.
/// iteration over a lazily loaded structure array.
#[macro_export]
macro_rules! try_or_ret_some_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => {
                return Some(Err(err));
            }
        }
    };
}
