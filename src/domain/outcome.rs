//! Two-variant containers used as the return vocabulary of every core
//! operation that can fail in an expected way.
//!
//! [`Outcome`] and [`Maybe`] carry no logging and no I/O; they are plain
//! control-flow values. `unwrap` is fail-fast on both types: unwrapping the
//! empty/error variant panics. Callers that need to inspect the error use
//! [`Outcome::fold`] or `is_err` instead.

/// Success-or-error container. The error payload is a first-class value, not
/// an exception: callers chain with [`Outcome::bind`] and eliminate with
/// [`Outcome::fold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Ok(T),
    Err(E),
}

impl<T, E> Outcome<T, E> {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Returns the success value, panicking on `Err`.
    pub fn unwrap(self) -> T
    where
        E: std::fmt::Debug,
    {
        match self {
            Self::Ok(value) => value,
            Self::Err(e) => panic!("called `Outcome::unwrap()` on an `Err` value: {e:?}"),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::Err(e) => Outcome::Err(e),
        }
    }

    pub fn map_err<F, G: FnOnce(E) -> F>(self, g: G) -> Outcome<T, F> {
        match self {
            Self::Ok(value) => Outcome::Ok(value),
            Self::Err(e) => Outcome::Err(g(e)),
        }
    }

    /// Chains a fallible continuation, short-circuiting on `Err`.
    pub fn bind<U, F: FnOnce(T) -> Outcome<U, E>>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Ok(value) => f(value),
            Self::Err(e) => Outcome::Err(e),
        }
    }

    /// Total elimination: exactly one of the two branches runs.
    pub fn fold<R>(self, on_ok: impl FnOnce(T) -> R, on_err: impl FnOnce(E) -> R) -> R {
        match self {
            Self::Ok(value) => on_ok(value),
            Self::Err(e) => on_err(e),
        }
    }

    /// Bridge into `std::result::Result` so HTTP handlers can use `?`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(e) => Err(e),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Err(e),
        }
    }
}

/// Present-or-absent container, independent of `Option` so that absence stays
/// an explicit domain signal rather than an incidental null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Maybe<T> {
    Some(T),
    Nothing,
}

impl<T> Maybe<T> {
    #[must_use]
    pub const fn is_some(&self) -> bool {
        matches!(self, Self::Some(_))
    }

    #[must_use]
    pub const fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Returns the contained value, panicking on `Nothing`.
    pub fn unwrap(self) -> T {
        match self {
            Self::Some(value) => value,
            Self::Nothing => panic!("called `Maybe::unwrap()` on a `Nothing` value"),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Maybe<U> {
        match self {
            Self::Some(value) => Maybe::Some(f(value)),
            Self::Nothing => Maybe::Nothing,
        }
    }

    /// Chains a continuation that may itself come up empty.
    pub fn bind<U, F: FnOnce(T) -> Maybe<U>>(self, f: F) -> Maybe<U> {
        match self {
            Self::Some(value) => f(value),
            Self::Nothing => Maybe::Nothing,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Some(value) => Some(value),
            Self::Nothing => None,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(option: Option<T>) -> Self {
        option.map_or(Self::Nothing, Self::Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Outcome<i32, String> {
        s.parse::<i32>()
            .map_or_else(|e| Outcome::Err(e.to_string()), Outcome::Ok)
    }

    #[test]
    fn test_outcome_map_passes_err_through() {
        let ok = parse("21").map(|n| n * 2);
        assert_eq!(ok, Outcome::Ok(42));

        let err = parse("nope").map(|n| n * 2);
        assert!(err.is_err());
    }

    #[test]
    fn test_outcome_bind_short_circuits() {
        let chained = parse("10").bind(|n| {
            if n > 5 {
                Outcome::Ok(n)
            } else {
                Outcome::Err("too small".to_string())
            }
        });
        assert_eq!(chained, Outcome::Ok(10));

        let failed = parse("bad").bind(|n| Outcome::Ok(n + 1));
        assert!(failed.is_err());
    }

    #[test]
    fn test_outcome_fold_is_total() {
        assert_eq!(parse("7").fold(|n| n, |_| -1), 7);
        assert_eq!(parse("x").fold(|n| n, |_| -1), -1);
    }

    #[test]
    #[should_panic(expected = "called `Outcome::unwrap()` on an `Err` value")]
    fn test_outcome_unwrap_err_panics() {
        parse("x").unwrap();
    }

    #[test]
    fn test_maybe_map_and_bind() {
        let some = Maybe::Some(3).map(|n| n + 1);
        assert_eq!(some, Maybe::Some(4));

        let nothing = Maybe::<i32>::Nothing.map(|n| n + 1);
        assert!(nothing.is_nothing());

        let bound = Maybe::Some(2).bind(|n| {
            if n % 2 == 0 {
                Maybe::Some(n / 2)
            } else {
                Maybe::Nothing
            }
        });
        assert_eq!(bound, Maybe::Some(1));
    }

    #[test]
    #[should_panic(expected = "called `Maybe::unwrap()` on a `Nothing` value")]
    fn test_maybe_unwrap_nothing_panics() {
        Maybe::<i32>::Nothing.unwrap();
    }

    #[test]
    fn test_option_round_trip() {
        assert_eq!(Maybe::from(Some(1)).into_option(), Some(1));
        assert_eq!(Maybe::<i32>::from(None).into_option(), None);
    }
}
