//! # rmtemplate
//!
//! Rule-table driven configuration management for network devices.
//!
//! One declarative rule table describes how a device prints a piece of its
//! configuration and how to configure it. From that table this crate can:
//!
//! - **parse** device output into a structured fact tree ("have"),
//! - **render** structured data back into device commands,
//! - **diff** a desired tree ("want") against "have" and produce the ordered
//!   commands that converge the device,
//! - **control** a resource through the usual operating states (merged,
//!   replaced, overridden, deleted, purged, gathered, rendered, parsed).
//!
//! The crate knows nothing about any platform: all syntax lives in the rule
//! table supplied by the caller.
//!
//! ## Example
//!
//! ```ignore
//! use rmtemplate::{Rule, RuleTable, TemplateEngine};
//! use serde_json::json;
//!
//! let rules = RuleTable::new(vec![
//!     Rule::new("hostname", r"^hostname (?P<name>\S+)$")?
//!         .with_result(json!({"hostname": "{{ name }}"}))
//!         .with_setval("hostname {{ hostname }}"),
//! ])?;
//! let engine = TemplateEngine::new(rules);
//!
//! let have = engine.parse_text("hostname R1")?;
//! assert_eq!(have, json!({"hostname": "R1"}));
//!
//! let commands = engine.compare(&["hostname"], &json!({"hostname": "R2"}), &have)?;
//! assert_eq!(commands, vec!["hostname R2"]);
//! ```
//!
//! ## Collaborator Traits
//!
//! The [`Controller`] talks to devices only through traits:
//!
//! - [`Connection`]: runs show commands and pushes configuration
//! - [`Facts`]: produces current-state facts, live or from captured output
//! - [`ResourceModule`]: names the resource and owns its rule table
//!
//! [`TemplateFacts`] is a ready-made [`Facts`] that parses device output with
//! the module's own rule table.

pub mod context;
pub mod controller;
pub mod diff;
pub mod engine;
pub mod error;
pub mod parser;
pub mod render;
pub mod rules;
pub mod template;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use context::{Connection, FactSource, Facts, Gathered, TemplateFacts};
pub use controller::{Controller, Request, ResourceModule, RunOptions, RunResult};
pub use diff::Differ;
pub use engine::TemplateEngine;
pub use error::{Error, Result};
pub use parser::{Parser, deepformat};
pub use render::Renderer;
pub use rules::{Rule, RuleDocument, RuleSpec, RuleTable};
pub use template::Evaluator;
pub use types::{Prefixes, Rendered, SetVal, State, Template};
