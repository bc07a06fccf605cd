//! Controller registry.
//!
//! Ordered set of authorized addresses. Iteration follows insertion order,
//! which is what `Get-Controllers` and every broadcast fan-out observe.
//! The registry knows nothing about proposals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque controller / sender address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Insertion-ordered set of controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerRegistry {
    controllers: Vec<Address>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.controllers.contains(address)
    }

    pub fn count(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Controllers in insertion order.
    pub fn list(&self) -> &[Address] {
        &self.controllers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.controllers.iter()
    }

    /// Append a controller. The caller has already checked it is absent.
    pub fn add(&mut self, address: Address) {
        debug_assert!(!self.contains(&address), "duplicate controller {address}");
        self.controllers.push(address);
    }

    /// Remove a controller, preserving the order of the rest. The caller has
    /// already checked it is present.
    pub fn remove(&mut self, address: &Address) {
        debug_assert!(self.contains(address), "unknown controller {address}");
        self.controllers.retain(|c| c != address);
    }
}
