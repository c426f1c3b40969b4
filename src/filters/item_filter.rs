//! Predicates recognized by the item listing.

use super::{Callbacks, Filter, FilterValue, Predicate, contains_pattern};
use sqlx::{QueryBuilder, Sqlite};

pub const Q: &str = "q";
pub const STATUS: &str = "status";
pub const OPTIONS: &str = "options";

pub fn callbacks() -> Callbacks {
    let mut callbacks = Callbacks::new();
    callbacks.insert(Q, q as Predicate);
    callbacks.insert(STATUS, status as Predicate);
    callbacks.insert(OPTIONS, options as Predicate);
    callbacks
}

pub fn filter<I>(params: I) -> Filter
where
    I: IntoIterator<Item = (String, FilterValue)>,
{
    Filter::new(callbacks(), params)
}

/// Free text: title OR body contains the value.
fn q(builder: &mut QueryBuilder<'_, Sqlite>, value: &FilterValue) {
    let pattern = contains_pattern(&value.text().unwrap_or_default());
    builder
        .push("items.title LIKE ")
        .push_bind(pattern.clone())
        .push(" ESCAPE '\\' OR items.body LIKE ")
        .push_bind(pattern)
        .push(" ESCAPE '\\'");
}

fn status(builder: &mut QueryBuilder<'_, Sqlite>, value: &FilterValue) {
    builder.push("items.status = ");
    match value {
        FilterValue::Int(code) => builder.push_bind(*code),
        other => builder.push_bind(other.text().unwrap_or_default()),
    };
}

/// For every option code, the item must carry that option with one of the
/// listed values.
fn options(builder: &mut QueryBuilder<'_, Sqlite>, value: &FilterValue) {
    let FilterValue::Choices(choices) = value else {
        builder.push("1 = 1");
        return;
    };

    for (i, (abbr, values)) in choices.iter().enumerate() {
        if i > 0 {
            builder.push(" AND ");
        }
        builder
            .push(
                "EXISTS (SELECT 1 FROM item_options io \
                 JOIN options o ON o.id = io.option_id \
                 WHERE io.item_id = items.id AND o.abbr = ",
            )
            .push_bind(abbr.clone())
            .push(" AND io.value IN (");
        let mut separated = builder.separated(", ");
        for v in values {
            separated.push_bind(v.clone());
        }
        separated.push_unseparated("))");
    }
}
