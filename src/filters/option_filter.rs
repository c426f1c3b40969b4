//! Predicates recognized by the option listing.

use super::{Callbacks, Filter, FilterValue, Predicate, contains_pattern};
use sqlx::{QueryBuilder, Sqlite};

pub const Q: &str = "q";

pub fn callbacks() -> Callbacks {
    let mut callbacks = Callbacks::new();
    callbacks.insert(Q, q as Predicate);
    callbacks
}

pub fn filter<I>(params: I) -> Filter
where
    I: IntoIterator<Item = (String, FilterValue)>,
{
    Filter::new(callbacks(), params)
}

fn q(builder: &mut QueryBuilder<'_, Sqlite>, value: &FilterValue) {
    builder
        .push("options.title LIKE ")
        .push_bind(contains_pattern(&value.text().unwrap_or_default()))
        .push(" ESCAPE '\\'");
}
