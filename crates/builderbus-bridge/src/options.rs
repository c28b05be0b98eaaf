//! Which store actions the bridge republishes.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::action::Action;

type Predicate = Arc<dyn Fn(&Action) -> bool + Send + Sync>;

/// Publishing filter for the bridge
///
/// Exactly one gate decides each action, in this order of precedence:
/// the `should_publish` predicate, then the `include_only` whitelist, then
/// the `exclude` list. With no gate configured every action is published.
#[derive(Clone, Default)]
pub struct BridgeOptions {
    exclude: HashSet<String>,
    include_only: Option<HashSet<String>>,
    should_publish: Option<Predicate>,
}

impl BridgeOptions {
    /// Options that publish every action
    pub fn new() -> Self {
        Self::default()
    }

    /// Never publish these action types
    pub fn exclude<I, S>(mut self, action_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(action_types.into_iter().map(Into::into));
        self
    }

    /// Publish only these action types
    pub fn include_only<I, S>(mut self, action_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_only = Some(action_types.into_iter().map(Into::into).collect());
        self
    }

    /// Decide per action with a predicate
    pub fn should_publish<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Action) -> bool + Send + Sync + 'static,
    {
        self.should_publish = Some(Arc::new(predicate));
        self
    }

    /// Whether the action passes the configured gate
    pub fn allows(&self, action: &Action) -> bool {
        if let Some(predicate) = &self.should_publish {
            return predicate(action);
        }
        if let Some(include) = &self.include_only {
            return include.contains(&action.action_type);
        }
        !self.exclude.contains(&action.action_type)
    }
}

impl fmt::Debug for BridgeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeOptions")
            .field("exclude", &self.exclude)
            .field("include_only", &self.include_only)
            .field("should_publish", &self.should_publish.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_everything() {
        assert!(BridgeOptions::new().allows(&Action::new("anything")));
    }

    #[test]
    fn test_exclude() {
        let options = BridgeOptions::new().exclude(["ui/hover"]);
        assert!(!options.allows(&Action::new("ui/hover")));
        assert!(options.allows(&Action::new("tasks/add")));
    }

    #[test]
    fn test_include_only_overrides_exclude() {
        let options = BridgeOptions::new()
            .exclude(["tasks/add"])
            .include_only(["tasks/add", "tasks/remove"]);
        assert!(options.allows(&Action::new("tasks/add")));
        assert!(!options.allows(&Action::new("ui/hover")));
    }

    #[test]
    fn test_predicate_overrides_lists() {
        let options = BridgeOptions::new()
            .include_only(["tasks/add"])
            .should_publish(|action| !action.error);
        assert!(options.allows(&Action::new("ui/hover")));
        assert!(!options.allows(&Action::new("tasks/add").as_error()));
    }
}
