//! Process-wide (section, action) → handler registry.
//!
//! # Responsibility
//! - Record which handler services each (section, action) pair.
//! - Reject conflicting registrations at startup.
//!
//! # Invariants
//! - A (section, action) pair maps to at most one handler name.
//! - Handler names are non-empty and trimmed.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::request::{Action, Section};

/// Registration errors; any of them aborts startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidHandlerName(String),
    Duplicate {
        section: Section,
        action: Action,
        existing: String,
        rejected: String,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHandlerName(value) => write!(f, "handler name is invalid: `{value}`"),
            Self::Duplicate {
                section,
                action,
                existing,
                rejected,
            } => write!(
                f,
                "{section}/{action} already registered to `{existing}`; refusing `{rejected}`"
            ),
        }
    }
}

impl Error for RegistryError {}

/// Routing table filled by every handler's `register_requests`.
#[derive(Debug, Clone, Default)]
pub struct HandlerMap {
    routes: BTreeMap<(Section, Action), String>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims one (section, action) pair for `handler`.
    pub fn register(
        &mut self,
        section: Section,
        action: Action,
        handler: &str,
    ) -> Result<(), RegistryError> {
        let handler = handler.trim();
        if handler.is_empty() {
            return Err(RegistryError::InvalidHandlerName(handler.to_string()));
        }
        if let Some(existing) = self.routes.get(&(section, action)) {
            return Err(RegistryError::Duplicate {
                section,
                action,
                existing: existing.clone(),
                rejected: handler.to_string(),
            });
        }

        self.routes.insert((section, action), handler.to_string());
        Ok(())
    }

    /// Handler name servicing the pair, if any.
    pub fn get(&self, section: Section, action: Action) -> Option<&str> {
        self.routes.get(&(section, action)).map(String::as_str)
    }

    /// Pairs claimed by one handler, in registry order.
    pub fn routes_of(&self, handler: &str) -> Vec<(Section, Action)> {
        self.routes
            .iter()
            .filter(|(_, name)| name.as_str() == handler)
            .map(|(route, _)| *route)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{HandlerMap, RegistryError};
    use crate::model::request::{Action, Section};

    #[test]
    fn register_and_lookup() {
        let mut map = HandlerMap::new();
        map.register(Section::Group, Action::List, "group_r").unwrap();
        map.register(Section::Group, Action::Show, "group_r").unwrap();

        assert_eq!(map.get(Section::Group, Action::List), Some("group_r"));
        assert_eq!(map.get(Section::Group, Action::MemberList), None);
        assert_eq!(
            map.routes_of("group_r"),
            vec![(Section::Group, Action::List), (Section::Group, Action::Show)]
        );
    }

    #[test]
    fn duplicate_pair_is_rejected_and_first_claim_kept() {
        let mut map = HandlerMap::new();
        map.register(Section::Node, Action::Show, "node_r").unwrap();

        let err = map
            .register(Section::Node, Action::Show, "other_r")
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
        assert!(err.to_string().contains("node/show"));
        assert_eq!(map.get(Section::Node, Action::Show), Some("node_r"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn blank_handler_name_is_rejected() {
        let mut map = HandlerMap::new();
        let err = map.register(Section::Node, Action::List, "  ").unwrap_err();
        assert_eq!(err, RegistryError::InvalidHandlerName(String::new()));
        assert!(map.is_empty());
    }
}
