//! Quick searches: turning what the user typed into an address.
//!
//! The table is a default search template plus ordered `token template`
//! pairs. Typing `w rust` with a `w` entry fetches the `w` template followed by
//! `rust`; anything that is neither an address nor a token query goes to the
//! default template.

use tracing::{debug, warn};

use crate::address;
use crate::error::BrowserError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSearch {
    pub token: String,
    pub template: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickSearchTable {
    default: Option<String>,
    entries: Vec<QuickSearch>,
}

impl QuickSearchTable {
    pub fn new(default: Option<String>, entries: Vec<QuickSearch>) -> Self {
        Self { default, entries }
    }

    /// Parse the persisted form `default token1 template1 token2 template2 ...`.
    /// A dangling token without a template is dropped.
    pub fn parse(serialized: &str) -> Self {
        let mut parts = serialized.split(' ');
        let default = parts
            .next()
            .filter(|first| !first.is_empty())
            .map(str::to_string);

        let rest: Vec<&str> = parts.collect();
        let mut entries = Vec::with_capacity(rest.len() / 2);
        for pair in rest.chunks(2) {
            match pair {
                [token, template] => entries.push(QuickSearch {
                    token: token.to_string(),
                    template: template.to_string(),
                }),
                [token] => warn!(token, "quick search token without template ignored"),
                _ => {}
            }
        }
        Self { default, entries }
    }

    pub fn serialize(&self) -> String {
        self.default
            .iter()
            .map(String::as_str)
            .chain(
                self.entries
                    .iter()
                    .flat_map(|e| [e.token.as_str(), e.template.as_str()]),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn default_search(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn entries(&self) -> &[QuickSearch] {
        &self.entries
    }

    /// Destination address for `input`. Blank input yields an empty address,
    /// which callers treat as "do not navigate".
    pub fn translate(&self, input: &str) -> String {
        if input.trim().is_empty() {
            return String::new();
        }
        if address::is_well_formed(input) {
            return input.to_string();
        }
        if address::looks_like_host(input) {
            return format!("http://{input}");
        }
        for entry in &self.entries {
            if let Some(query) = input
                .strip_prefix(entry.token.as_str())
                .and_then(|rest| rest.strip_prefix(' '))
            {
                return format!("{}{}", entry.template, query);
            }
        }
        match &self.default {
            Some(default) => format!("{default}{input}"),
            None => input.to_string(),
        }
    }

    /// Edit the table from one line of user input:
    /// - `template` (address shaped) replaces the default search,
    /// - `token` removes that entry,
    /// - `token template` adds or replaces an entry.
    ///
    /// Returns the new serialized table.
    pub fn change(&mut self, input: &str) -> Result<String, BrowserError> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.as_slice() {
            [single] if address::looks_like_host(single) => {
                self.default = Some(single.to_string());
            }
            [token] => {
                let index = self
                    .entries
                    .iter()
                    .position(|e| e.token == *token)
                    .ok_or(BrowserError::QuickSearchNotFound)?;
                self.entries.remove(index);
            }
            [token, template] => {
                if self.default.is_none() {
                    return Err(BrowserError::QuickSearchNeedsBase);
                }
                match self.entries.iter_mut().find(|e| e.token == *token) {
                    Some(entry) => entry.template = template.to_string(),
                    None => self.entries.push(QuickSearch {
                        token: token.to_string(),
                        template: template.to_string(),
                    }),
                }
            }
            _ => return Err(BrowserError::QuickSearchFormat(input.to_string())),
        }
        let serialized = self.serialize();
        debug!(table = %serialized, "quick search table changed");
        Ok(serialized)
    }
}
