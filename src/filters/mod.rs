//! Named-predicate filtering over a SQL query builder.
//!
//! A [`Filter`] pairs a table of recognized parameter names and predicate
//! functions with the parameters of one request. [`Filter::apply`] appends a
//! condition for every recognized parameter that is present; conditions from
//! different parameters are joined with `AND`, and a parameter that is absent
//! contributes nothing to the query at all.
//!
//! Each entity builds its own table: see [`item_filter`] and [`option_filter`].

pub mod item_filter;
pub mod option_filter;

use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeMap;

/// A request value handed to a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    /// Code → acceptable values, e.g. `color → [red, blue]`.
    Choices(BTreeMap<String, Vec<String>>),
}

impl FilterValue {
    /// Scalar value as text, `None` for choice maps.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Int(value) => Some(value.to_string()),
            Self::Choices(_) => None,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Int(_) => false,
            Self::Choices(choices) => choices.is_empty(),
        }
    }

    /// Drop blank codes and blank values so an emptied entry reads as absent.
    fn normalized(self) -> Self {
        match self {
            Self::Choices(choices) => Self::Choices(
                choices
                    .into_iter()
                    .filter(|(code, _)| !code.trim().is_empty())
                    .map(|(code, values)| {
                        let values = values
                            .into_iter()
                            .map(|v| v.trim().to_string())
                            .filter(|v| !v.is_empty())
                            .collect::<Vec<_>>();
                        (code, values)
                    })
                    .filter(|(_, values)| !values.is_empty())
                    .collect(),
            ),
            other => other,
        }
    }
}

/// `%value%` for a `LIKE ... ESCAPE '\'` substring match, with the
/// wildcards of `value` taken literally.
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends one self-contained condition for `value` to the builder.
pub type Predicate = for<'q> fn(&mut QueryBuilder<'q, Sqlite>, &FilterValue);

/// Recognized parameter name → predicate.
pub type Callbacks = BTreeMap<&'static str, Predicate>;

#[derive(Debug, Clone)]
pub struct Filter {
    callbacks: Callbacks,
    params: BTreeMap<String, FilterValue>,
}

impl Filter {
    /// Empty strings and empty choice maps are dropped here, so they behave
    /// exactly like parameters that were never sent.
    pub fn new<I>(callbacks: Callbacks, params: I) -> Self
    where
        I: IntoIterator<Item = (String, FilterValue)>,
    {
        let params = params
            .into_iter()
            .map(|(name, value)| (name, value.normalized()))
            .filter(|(_, value)| !value.is_empty())
            .collect();
        Self { callbacks, params }
    }

    /// Names of the recognized parameters that will contribute a condition.
    pub fn active(&self) -> Vec<&'static str> {
        self.callbacks
            .keys()
            .copied()
            .filter(|name| self.params.contains_key(*name))
            .collect()
    }

    /// Append the conditions to `builder`, which must end right where a
    /// `WHERE` clause may start. Returns how many predicates ran.
    pub fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> usize {
        let mut applied = 0;
        for (name, predicate) in &self.callbacks {
            let Some(value) = self.params.get(*name) else {
                continue;
            };
            builder.push(if applied == 0 { " WHERE (" } else { " AND (" });
            predicate(builder, value);
            builder.push(")");
            applied += 1;
        }
        applied
    }
}
