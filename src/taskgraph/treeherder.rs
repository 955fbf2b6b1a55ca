//! Treeherder Symbols and Inheritance
//!
//! Symbols are written either bare (`UV`) or grouped (`UV(UV)`). Chunked
//! tasks append their ordinal to the inner symbol so siblings stay in one
//! group but remain distinguishable.

use std::fmt;

use super::model::{JobTemplate, Task, Treeherder};
use crate::error::{Result, TransformError};

/// Placeholder group for symbols written without one.
pub const NO_GROUP: &str = "?";

/// A treeherder symbol split into group and symbol parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeherderSymbol {
    pub group: String,
    pub symbol: String,
}

impl TreeherderSymbol {
    /// Splits `grp(sym)` into its parts; a bare symbol gets group `?`.
    ///
    /// Returns `None` for an opening parenthesis without a closing one.
    /// Anything after the closing parenthesis is ignored.
    ///
    /// # Example
    /// ```
    /// use uvchunk::taskgraph::treeherder::TreeherderSymbol;
    ///
    /// let parsed = TreeherderSymbol::parse("UV(UV)").unwrap();
    /// assert_eq!(parsed.group, "UV");
    /// assert_eq!(parsed.symbol, "UV");
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let Some((group, rest)) = text.split_once('(') else {
            return Some(Self {
                group: NO_GROUP.to_string(),
                symbol: text.to_string(),
            });
        };

        let (symbol, _) = rest.split_once(')')?;
        Some(Self {
            group: group.to_string(),
            symbol: symbol.to_string(),
        })
    }

    /// Returns a copy with `suffix` appended to the inner symbol.
    pub fn with_suffix(&self, suffix: impl fmt::Display) -> Self {
        Self {
            group: self.group.clone(),
            symbol: format!("{}{}", self.symbol, suffix),
        }
    }
}

impl fmt::Display for TreeherderSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group == NO_GROUP {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{}({})", self.group, self.symbol)
        }
    }
}

/// Adds a suffix to a symbol that may contain a group.
///
/// # Example
/// ```
/// use uvchunk::taskgraph::treeherder::add_suffix;
///
/// assert_eq!(add_suffix("UV(UV)", 3), Some("UV(UV3)".to_string()));
/// assert_eq!(add_suffix("UV", 3), Some("UV3".to_string()));
/// ```
pub fn add_suffix(symbol: &str, suffix: impl fmt::Display) -> Option<String> {
    TreeherderSymbol::parse(symbol).map(|parsed| parsed.with_suffix(suffix).to_string())
}

/// Builds a job's treeherder block from its own plus the dependency's.
///
/// Values already set on the job win. `platform` defaults to
/// `<dep platform>/<dep collection>`, `tier` to the dep's tier (or 1) and
/// `kind` to `build`. The symbol is never inherited.
pub fn inherit_treeherder_from_dep(job: &JobTemplate, dep: &Task) -> Result<Treeherder> {
    let mut treeherder = job.treeherder.clone().unwrap_or_default();

    let collection = dep
        .treeherder_collection()
        .ok_or_else(|| TransformError::MissingField {
            label: dep.label.clone(),
            field: "extra.treeherder.collection".to_string(),
        })?;

    if treeherder.platform.is_none() {
        treeherder.platform = Some(format!("{}/{}", dep.treeherder_platform(), collection));
    }
    if treeherder.tier.is_none() {
        treeherder.tier = Some(dep.treeherder_tier().unwrap_or(1));
    }
    if treeherder.kind.is_none() {
        treeherder.kind = Some("build".to_string());
    }

    Ok(treeherder)
}
