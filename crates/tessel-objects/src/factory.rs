#![forbid(unsafe_code)]

//! Ordered constructor lists for polymorphic object creation.
//!
//! An [`ImageFactory`] holds named constructors tried in order until one
//! succeeds. Registration is explicit; nothing is discovered at runtime.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No constructors registered | `Error::Precondition` |
//! | Preferred constructor fails with `fail_fast` | that error, unchanged |
//! | Every constructor fails | `Error::Factory` with each failure in try order |

use std::fmt;

use tessel_core::{Error, Result};

/// Constructor signature.
pub type Constructor<A, T> = Box<dyn Fn(&A) -> Result<T>>;

struct Entry<A, T> {
    name: String,
    ctor: Constructor<A, T>,
}

/// Named constructors building a `T` from arguments `A`.
pub struct ImageFactory<A, T> {
    entries: Vec<Entry<A, T>>,
}

impl<A, T> Default for ImageFactory<A, T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<A, T> fmt::Debug for ImageFactory<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFactory")
            .field("constructors", &self.constructors().collect::<Vec<_>>())
            .finish()
    }
}

impl<A, T> ImageFactory<A, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ctor` under `name` at `position` (appended when `None` or
    /// past the end). Returns false, changing nothing, if `name` is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(&A) -> Result<T> + 'static,
        position: Option<usize>,
    ) -> bool {
        let name = name.into();
        if self.entries.iter().any(|e| e.name == name) {
            return false;
        }
        let at = position.map_or(self.entries.len(), |p| p.min(self.entries.len()));
        self.entries.insert(
            at,
            Entry {
                name,
                ctor: Box::new(ctor),
            },
        );
        true
    }

    /// Names in try order.
    pub fn constructors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Build from `args`.
    ///
    /// `preferred` is tried first; if it fails and `fail_fast` is set its
    /// error is returned at once. The remaining constructors are then tried
    /// in order and the first success wins.
    pub fn build(&self, args: &A, preferred: Option<&str>, fail_fast: bool) -> Result<T> {
        if self.entries.is_empty() {
            return Err(Error::precondition("no constructors registered"));
        }
        let first = preferred.and_then(|name| self.entries.iter().position(|e| e.name == name));
        let order = first
            .into_iter()
            .chain((0..self.entries.len()).filter(|i| Some(*i) != first));
        let mut errors = Vec::new();
        for i in order {
            let entry = &self.entries[i];
            match (entry.ctor)(args) {
                Ok(obj) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(constructor = %entry.name, "factory built object");
                    return Ok(obj);
                }
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(constructor = %entry.name, error = %err, "factory constructor failed");
                    if fail_fast && Some(i) == first {
                        return Err(err);
                    }
                    errors.push(err);
                }
            }
        }
        Err(Error::Factory(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ImageFactory<i32, String> {
        let mut f = ImageFactory::new();
        f.register(
            "even",
            |n: &i32| {
                if n % 2 == 0 {
                    Ok(format!("even {n}"))
                } else {
                    Err(Error::invalid("odd"))
                }
            },
            None,
        );
        f.register(
            "small",
            |n: &i32| {
                if *n < 10 {
                    Ok(format!("small {n}"))
                } else {
                    Err(Error::out_of_range("big"))
                }
            },
            None,
        );
        f
    }

    #[test]
    fn first_success_in_order() {
        let f = factory();
        assert_eq!(f.build(&4, None, false).unwrap(), "even 4");
        assert_eq!(f.build(&3, None, false).unwrap(), "small 3");
    }

    #[test]
    fn preferred_goes_first() {
        let f = factory();
        assert_eq!(f.build(&4, Some("small"), false).unwrap(), "small 4");
        assert_eq!(f.build(&4, Some("missing"), false).unwrap(), "even 4");
    }

    #[test]
    fn fail_fast_returns_preferred_error() {
        let f = factory();
        let err = f.build(&12, Some("small"), true).unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(f.build(&3, Some("even"), false).unwrap(), "small 3");
    }

    #[test]
    fn total_failure_collects_every_error() {
        let f = factory();
        match f.build(&13, None, false) {
            Err(Error::Factory(errs)) => {
                assert_eq!(errs.len(), 2);
                assert!(errs[0].is_invalid_argument());
                assert!(errs[1].is_out_of_range());
            }
            other => panic!("expected factory error, got {other:?}"),
        }
    }

    #[test]
    fn empty_registry_is_a_precondition_error() {
        let mut f = factory();
        f.clear();
        assert!(f.build(&0, None, false).unwrap_err().is_precondition());
    }

    #[test]
    fn register_ignores_duplicates_and_honours_position() {
        let mut f = factory();
        assert!(!f.register("even", |_: &i32| Ok(String::new()), None));
        assert!(f.register("any", |n: &i32| Ok(format!("any {n}")), Some(0)));
        assert_eq!(f.constructors().collect::<Vec<_>>(), vec!["any", "even", "small"]);
        assert_eq!(f.build(&2, None, false).unwrap(), "any 2");
    }
}
