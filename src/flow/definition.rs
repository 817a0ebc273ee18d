//! Flow and step definitions
//!
//! This module defines the static shape of a guided flow: a graph of steps
//! with messages, quick replies, validation rules, and routing. Definitions
//! are plain data plus optional dynamic content functions evaluated against
//! the data a session has accumulated so far. Definitions are immutable once
//! registered; all per-session mutation lives in [`super::state::FlowState`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier of a step within one flow
pub type StepId = String;

/// The schema-less key/value record collected across a flow's steps.
///
/// Values are JSON so the whole bag serializes with the owning session
/// state. Insertion order is preserved, which keeps previews and logs
/// stable across runs.
pub type StepData = IndexMap<String, serde_json::Value>;

/// Dynamic message content, computed from accumulated data
pub type TextFn = Arc<dyn Fn(&StepData) -> String + Send + Sync>;

/// Dynamic quick replies, computed from accumulated data
pub type RepliesFn = Arc<dyn Fn(&StepData) -> Vec<QuickReply> + Send + Sync>;

/// Dynamic routing, computed from accumulated data and the raw user input
pub type NextStepFn = Arc<dyn Fn(&StepData, &str) -> StepId + Send + Sync>;

/// Custom validation predicate
pub type PredicateFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Step message that is either fixed or computed per session
#[derive(Clone)]
pub enum Text {
    Static(String),
    Dynamic(TextFn),
}

impl Text {
    /// Dynamic message from a plain function or closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&StepData) -> String + Send + Sync + 'static,
    {
        Text::Dynamic(Arc::new(f))
    }

    /// Evaluate the message against accumulated data
    pub fn render(&self, data: &StepData) -> String {
        match self {
            Text::Static(text) => text.clone(),
            Text::Dynamic(f) => f(data),
        }
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Text::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Text::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::Static(text.to_string())
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::Static(text)
    }
}

/// Quick replies that are either fixed or computed per session
#[derive(Clone)]
pub enum Replies {
    Static(Vec<QuickReply>),
    Dynamic(RepliesFn),
}

impl Replies {
    /// Dynamic quick replies from a plain function or closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&StepData) -> Vec<QuickReply> + Send + Sync + 'static,
    {
        Replies::Dynamic(Arc::new(f))
    }

    /// Evaluate the quick replies against accumulated data
    pub fn render(&self, data: &StepData) -> Vec<QuickReply> {
        match self {
            Replies::Static(replies) => replies.clone(),
            Replies::Dynamic(f) => f(data),
        }
    }
}

impl fmt::Debug for Replies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replies::Static(replies) => f.debug_tuple("Static").field(replies).finish(),
            Replies::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Routing rule for computing the step that follows this one
#[derive(Clone)]
pub enum NextStep {
    Static(StepId),
    Dynamic(NextStepFn),
}

impl NextStep {
    /// Compute the next step id from accumulated data and the raw input
    pub fn resolve(&self, data: &StepData, input: &str) -> StepId {
        match self {
            NextStep::Static(id) => id.clone(),
            NextStep::Dynamic(f) => f(data, input),
        }
    }
}

impl fmt::Debug for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextStep::Static(id) => f.debug_tuple("Static").field(id).finish(),
            NextStep::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A predefined label/value pair offered as an alternative to free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub value: String,
    pub icon: Option<String>,
}

impl QuickReply {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            icon: None,
        }
    }

    pub fn with_icon(label: &str, value: &str, icon: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            icon: Some(icon.to_string()),
        }
    }
}

/// Kinds of steps a flow graph is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepType {
    /// Opening message, collects no data
    Greeting,
    /// Free-text input
    Input,
    /// Choice among quick replies
    Select,
    /// Branching menu of available actions
    Hub,
    /// Read-back of collected data before committing
    Preview,
    /// Requires the caller to run an external action before continuing
    Execution,
    /// Outcome display
    Result,
}

/// A single validation rule with its user-facing rejection message
#[derive(Clone)]
pub enum ValidationRule {
    Required { message: String },
    MinLength { min: usize, message: String },
    MaxLength { max: usize, message: String },
    Min { min: f64, message: String },
    Max { max: f64, message: String },
    Pattern { pattern: Regex, message: String },
    Email { message: String },
    Custom { predicate: PredicateFn, message: String },
}

impl ValidationRule {
    /// The message shown when this rule rejects an input
    pub fn message(&self) -> &str {
        match self {
            ValidationRule::Required { message }
            | ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::Min { message, .. }
            | ValidationRule::Max { message, .. }
            | ValidationRule::Pattern { message, .. }
            | ValidationRule::Email { message }
            | ValidationRule::Custom { message, .. } => message,
        }
    }

    pub fn required(message: &str) -> Self {
        ValidationRule::Required {
            message: message.to_string(),
        }
    }

    pub fn min_length(min: usize, message: &str) -> Self {
        ValidationRule::MinLength {
            min,
            message: message.to_string(),
        }
    }

    pub fn max_length(max: usize, message: &str) -> Self {
        ValidationRule::MaxLength {
            max,
            message: message.to_string(),
        }
    }

    pub fn min(min: f64, message: &str) -> Self {
        ValidationRule::Min {
            min,
            message: message.to_string(),
        }
    }

    pub fn max(max: f64, message: &str) -> Self {
        ValidationRule::Max {
            max,
            message: message.to_string(),
        }
    }

    /// Pattern rule from a regex literal. Panics on an invalid pattern, so
    /// only use with patterns fixed at flow-definition time.
    pub fn pattern(pattern: &str, message: &str) -> Self {
        ValidationRule::Pattern {
            pattern: Regex::new(pattern).expect("invalid validation pattern"),
            message: message.to_string(),
        }
    }

    pub fn email(message: &str) -> Self {
        ValidationRule::Email {
            message: message.to_string(),
        }
    }

    pub fn custom<F>(predicate: F, message: &str) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        ValidationRule::Custom {
            predicate: Arc::new(predicate),
            message: message.to_string(),
        }
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Required { .. } => f.write_str("Required"),
            ValidationRule::MinLength { min, .. } => write!(f, "MinLength({})", min),
            ValidationRule::MaxLength { max, .. } => write!(f, "MaxLength({})", max),
            ValidationRule::Min { min, .. } => write!(f, "Min({})", min),
            ValidationRule::Max { max, .. } => write!(f, "Max({})", max),
            ValidationRule::Pattern { pattern, .. } => write!(f, "Pattern({})", pattern),
            ValidationRule::Email { .. } => f.write_str("Email"),
            ValidationRule::Custom { .. } => f.write_str("Custom(..)"),
        }
    }
}

/// One node in a flow's graph
#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub id: StepId,
    pub step_type: StepType,
    pub message: Text,
    pub quick_replies: Option<Replies>,
    pub validation_rules: Vec<ValidationRule>,
    pub next_step: NextStep,
    pub can_go_back: bool,
    pub can_skip: bool,
    pub skip_to_step: Option<StepId>,
    /// Storage key for the input collected at this step; defaults to the id
    pub data_key: Option<String>,
}

impl StepDefinition {
    /// Create a step with defaults: self-routing, back allowed, not skippable
    pub fn new(id: &str, step_type: StepType, message: impl Into<Text>) -> Self {
        Self {
            id: id.to_string(),
            step_type,
            message: message.into(),
            quick_replies: None,
            validation_rules: Vec::new(),
            next_step: NextStep::Static(id.to_string()),
            can_go_back: true,
            can_skip: false,
            skip_to_step: None,
            data_key: None,
        }
    }

    /// Route to a fixed next step
    pub fn then(mut self, next: &str) -> Self {
        self.next_step = NextStep::Static(next.to_string());
        self
    }

    /// Route through a function of accumulated data and the raw input
    pub fn then_with<F>(mut self, next: F) -> Self
    where
        F: Fn(&StepData, &str) -> StepId + Send + Sync + 'static,
    {
        self.next_step = NextStep::Dynamic(Arc::new(next));
        self
    }

    pub fn with_replies(mut self, replies: Vec<QuickReply>) -> Self {
        self.quick_replies = Some(Replies::Static(replies));
        self
    }

    pub fn with_replies_fn<F>(mut self, replies: F) -> Self
    where
        F: Fn(&StepData) -> Vec<QuickReply> + Send + Sync + 'static,
    {
        self.quick_replies = Some(Replies::Dynamic(Arc::new(replies)));
        self
    }

    pub fn with_rules(mut self, rules: Vec<ValidationRule>) -> Self {
        self.validation_rules = rules;
        self
    }

    /// Disable back-navigation from this step
    pub fn no_back(mut self) -> Self {
        self.can_go_back = false;
        self
    }

    /// Allow skipping this step, routing directly to the given target
    pub fn skippable(mut self, skip_to: &str) -> Self {
        self.can_skip = true;
        self.skip_to_step = Some(skip_to.to_string());
        self
    }

    pub fn with_data_key(mut self, key: &str) -> Self {
        self.data_key = Some(key.to_string());
        self
    }

    /// The key under which this step's input is stored
    pub fn storage_key(&self) -> &str {
        self.data_key.as_deref().unwrap_or(&self.id)
    }
}

/// A named, reusable definition of a multi-step guided interaction
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    pub id: String,
    pub steps: HashMap<StepId, StepDefinition>,
    pub initial_step: StepId,
    pub completed_step: StepId,
}

impl FlowDefinition {
    pub fn new(id: &str, initial_step: &str, completed_step: &str) -> Self {
        Self {
            id: id.to_string(),
            steps: HashMap::new(),
            initial_step: initial_step.to_string(),
            completed_step: completed_step.to_string(),
        }
    }

    /// Add a step, keyed by its id
    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.insert(step.id.clone(), step);
        self
    }

    pub fn step(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.get(id)
    }
}
