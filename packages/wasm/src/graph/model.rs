//! Serialized scoping graph as produced by the scoping tool.
//!
//! The input object is `{nodes, links, is_forward}`: nodes carry a layer
//! (`group`) and their precondition/effect facts, links reference node ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The whole graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<RawNode>,
    pub links: Vec<RawLink>,
    /// Forward (reachability) pass when true, backward (relevance) pass otherwise.
    #[serde(default = "default_forward")]
    pub is_forward: bool,
}

fn default_forward() -> bool {
    true
}

impl GraphData {
    /// Parse a graph document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A node as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    pub group: u32,
    #[serde(default)]
    pub precondition: Vec<Fact>,
    #[serde(default)]
    pub effect: Vec<Fact>,
}

/// A directed link between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub source: String,
    pub target: String,
}

/// One precondition or effect entry.
///
/// The scoping tool writes facts either as preformatted strings or as
/// `[variable, value]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fact {
    Text(String),
    Pair(String, FactValue),
}

/// Value half of a `[variable, value]` fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Pair(var, value) => write!(f, "{var}={value}"),
        }
    }
}
