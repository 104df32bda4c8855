#![forbid(unsafe_code)]

//! Deferred actions grouped by name.
//!
//! An [`Action`] is a callback plus the positional and keyword arguments it
//! will be called with. Actions are appended to named groups and run in
//! insertion order by [`ActionGroups::raise`]. Nothing runs implicitly.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use tessel_core::Result;

/// Group used when no name is given.
pub const DEFAULT_GROUP: &str = "default";

/// Callback signature: positional args, keyword args.
pub type Callback = Box<dyn FnMut(&[Value], &Map<String, Value>) -> Result<()>>;

/// A callback with its bound arguments.
pub struct Action {
    callback: Callback,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl Action {
    pub fn new(
        callback: impl FnMut(&[Value], &Map<String, Value>) -> Result<()> + 'static,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Self {
        Self {
            callback: Box::new(callback),
            args,
            kwargs,
        }
    }

    /// Run the callback with the bound arguments.
    pub fn call(&mut self) -> Result<()> {
        (self.callback)(&self.args, &self.kwargs)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish_non_exhaustive()
    }
}

/// Named, ordered lists of actions.
#[derive(Debug, Default)]
pub struct ActionGroups {
    groups: BTreeMap<String, Vec<Action>>,
}

impl ActionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action to `group` (the default group when `None`).
    pub fn set(
        &mut self,
        callback: impl FnMut(&[Value], &Map<String, Value>) -> Result<()> + 'static,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
        group: Option<&str>,
    ) {
        self.push(Action::new(callback, args, kwargs), group);
    }

    /// Append a prepared action.
    pub fn push(&mut self, action: Action, group: Option<&str>) {
        self.groups
            .entry(group.unwrap_or(DEFAULT_GROUP).to_owned())
            .or_default()
            .push(action);
    }

    /// Run every action of `group` in insertion order.
    ///
    /// Stops at, and returns, the first callback error. An unknown group
    /// runs nothing.
    pub fn raise(&mut self, group: Option<&str>) -> Result<()> {
        let name = group.unwrap_or(DEFAULT_GROUP);
        let Some(actions) = self.groups.get_mut(name) else {
            return Ok(());
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(group = name, count = actions.len(), "raising actions");
        actions.iter_mut().try_for_each(Action::call)
    }

    /// Remove `group` and return its actions, `None` if it never existed.
    pub fn remove(&mut self, group: &str) -> Option<Vec<Action>> {
        self.groups.remove(group)
    }

    /// Actions of `group`, if present.
    pub fn get(&self, group: &str) -> Option<&[Action]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Group names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tessel_core::Error;

    #[test]
    fn raise_runs_in_insertion_order_with_args() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut groups = ActionGroups::new();
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            let mut kwargs = Map::new();
            kwargs.insert("tag".into(), json!(tag));
            groups.set(
                move |args, kw| {
                    log.borrow_mut().push(format!("{}:{}", kw["tag"], args.len()));
                    Ok(())
                },
                vec![json!(1), json!("x")],
                kwargs,
                None,
            );
        }
        groups.raise(None).unwrap();
        assert_eq!(*log.borrow(), vec!["\"a\":2", "\"b\":2"]);
    }

    #[test]
    fn raise_propagates_first_failure() {
        let hits = Rc::new(RefCell::new(0));
        let mut groups = ActionGroups::new();
        groups.set(|_, _| Err(Error::precondition("boom")), vec![], Map::new(), Some("g"));
        let h = Rc::clone(&hits);
        groups.set(
            move |_, _| {
                *h.borrow_mut() += 1;
                Ok(())
            },
            vec![],
            Map::new(),
            Some("g"),
        );
        assert!(groups.raise(Some("g")).unwrap_err().is_precondition());
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn remove_returns_group_or_none() {
        let mut groups = ActionGroups::new();
        groups.set(|_, _| Ok(()), vec![], Map::new(), None);
        assert!(groups.remove("missing").is_none());
        assert_eq!(groups.remove(DEFAULT_GROUP).map(|v| v.len()), Some(1));
        assert!(groups.is_empty());
        assert!(groups.raise(None).is_ok());
    }
}
