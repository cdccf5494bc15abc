use std::fmt;

/// An expected value, or a set of values any of which is acceptable.
///
/// Engines normalize some metadata differently (Oracle has no `ON UPDATE`,
/// MySQL may report `RESTRICT` where others report `NO ACTION`), so checks
/// take one of these instead of a bare value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected<T> {
    Exactly(T),
    OneOf(Vec<T>),
}

impl<T: PartialEq> Expected<T> {
    pub fn accepts(&self, actual: &T) -> bool {
        match self {
            Expected::Exactly(expected) => expected == actual,
            Expected::OneOf(accepted) => accepted.contains(actual),
        }
    }
}

impl<T> From<T> for Expected<T> {
    fn from(value: T) -> Self {
        Expected::Exactly(value)
    }
}

impl<T> Expected<T> {
    pub fn one_of(values: impl IntoIterator<Item = T>) -> Self {
        Expected::OneOf(values.into_iter().collect())
    }
}

impl<T: fmt::Display> fmt::Display for Expected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Exactly(value) => write!(f, "{}", value),
            Expected::OneOf(values) => {
                f.write_str("one of [")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ReferentialAction;

    #[test]
    fn exact_value_accepts_only_itself() {
        let expected = Expected::from(ReferentialAction::NoAction);
        assert!(expected.accepts(&ReferentialAction::NoAction));
        assert!(!expected.accepts(&ReferentialAction::Restrict));
        assert_eq!(expected.to_string(), "NO ACTION");
    }

    #[test]
    fn accepted_set_accepts_any_member() {
        let expected = Expected::one_of([ReferentialAction::NoAction, ReferentialAction::Restrict]);
        assert!(expected.accepts(&ReferentialAction::Restrict));
        assert!(!expected.accepts(&ReferentialAction::Cascade));
        assert_eq!(expected.to_string(), "one of [NO ACTION, RESTRICT]");
    }
}
