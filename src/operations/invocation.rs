//! Caller input for one list call, validated before anything is sent

use super::request::OperationRequest;
use super::types::OperationDefinition;
use crate::error::{Error, Result};
use crate::pagination::{ListOptions, ResponseSelection};
use crate::types::ParamMap;

/// What the caller wants back from a list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every item of every page
    Items,
    /// The raw response body (`*`)
    RawResponse,
    /// The value of a parameter (`^name`), emitted once after the call
    Parameter(String),
}

impl Selector {
    /// Parse a selector for `definition`.
    ///
    /// Accepts `*`, `^<parameter>` or the operation's items field name.
    pub fn parse(selector: &str, definition: &OperationDefinition) -> Result<Self> {
        let invalid = || Error::InvalidSelector {
            operation: definition.name.clone(),
            selector: selector.to_string(),
            items_field: definition.items_field.clone(),
        };

        let selector_trimmed = selector.trim();
        if selector_trimmed == "*" {
            return Ok(Self::RawResponse);
        }
        if let Some(name) = selector_trimmed.strip_prefix('^') {
            return definition
                .param(name)
                .map(|p| Self::Parameter(p.name.clone()))
                .ok_or_else(invalid);
        }
        if selector_trimmed.eq_ignore_ascii_case(&definition.items_field) {
            return Ok(Self::Items);
        }
        Err(invalid())
    }

    /// Selection handed to the paginator
    pub fn response_selection(&self) -> ResponseSelection {
        match self {
            Self::RawResponse => ResponseSelection::RawResponse,
            Self::Items | Self::Parameter(_) => ResponseSelection::Items,
        }
    }
}

/// Arguments of one list call, as the caller supplied them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListInvocation {
    /// Operation parameters by wire name
    pub params: ParamMap,
    /// Page-size hint
    pub max_results: Option<u32>,
    /// Starting continuation token
    pub next_token: Option<String>,
    /// Fetch exactly one page
    pub no_auto_iteration: bool,
    /// Output selector (`*`, `^param` or the items field)
    pub select: Option<String>,
    /// Deprecated: emit the operation's pass-through parameter
    pub pass_thru: bool,
}

impl ListInvocation {
    /// Create an empty invocation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the page-size hint
    #[must_use]
    pub fn max_results(mut self, max: u32) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Set the starting continuation token
    #[must_use]
    pub fn next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    /// Fetch exactly one page
    #[must_use]
    pub fn no_auto_iteration(mut self) -> Self {
        self.no_auto_iteration = true;
        self
    }

    /// Set the output selector
    #[must_use]
    pub fn select(mut self, selector: impl Into<String>) -> Self {
        self.select = Some(selector.into());
        self
    }

    /// Request the deprecated pass-through output
    #[must_use]
    pub fn pass_thru(mut self) -> Self {
        self.pass_thru = true;
        self
    }

    /// Resolve the selector, rejecting `select` combined with `pass_thru`
    pub fn selector(&self, definition: &OperationDefinition) -> Result<Selector> {
        match (&self.select, self.pass_thru) {
            (Some(_), true) => Err(Error::conflicting("select", "pass-thru")),
            (Some(select), false) => Selector::parse(select, definition),
            (None, true) => definition
                .pass_thru
                .as_ref()
                .map(|name| Selector::Parameter(name.clone()))
                .ok_or_else(|| {
                    Error::invalid_parameter(
                        &definition.name,
                        "pass-thru",
                        "this operation has no pass-through parameter",
                    )
                }),
            (None, false) => Ok(Selector::Items),
        }
    }

    /// Validate everything and build the request, the selector and the paging options
    pub fn prepare(
        &self,
        definition: &OperationDefinition,
    ) -> Result<(OperationRequest, Selector, ListOptions)> {
        let selector = self.selector(definition)?;
        let request = OperationRequest::build(
            definition,
            &self.params,
            self.max_results,
            self.next_token.clone(),
        )?;

        let mut options = ListOptions::new().with_selection(selector.response_selection());
        options.no_auto_iteration = self.no_auto_iteration;

        Ok((request, selector, options))
    }
}
