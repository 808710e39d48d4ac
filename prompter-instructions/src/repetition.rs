//! Zero-or-more repetitions of a keyed item group.

use prompter_primitives::ValidationResult;
use prompter_primitives::text::{enumerate_list, scope};

use crate::list::{Item, describe_items, extract_items, split_sequence, validate_items};
use crate::{ExtractionResult, Instruction, Value};

/// A block of items the model may write any number of times.
///
/// Extraction yields a [`Value::List`] of groups, each itself a
/// [`Value::List`]. Text without the leading marker yields no groups.
#[derive(Clone, Debug)]
pub struct Repetition {
    quantifier: String,
    items: Vec<Item>,
}

impl Repetition {
    /// Creates a repetition introduced by `quantifier`, e.g.
    /// `"For every file you changed do the following"`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`](prompter_primitives::ValidationError) when
    /// `items` is empty, two items share a key, or an item uses the reserved
    /// `stop` key.
    pub fn new(
        quantifier: impl Into<String>,
        items: impl IntoIterator<Item = Item>,
    ) -> ValidationResult<Self> {
        let items: Vec<Item> = items.into_iter().collect();
        validate_items("repetition", &items)?;
        Ok(Self {
            quantifier: quantifier.into(),
            items,
        })
    }

    /// Returns the item template of a single group.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl Instruction for Repetition {
    fn describe(&self) -> String {
        format!(
            "{}{}",
            self.quantifier,
            scope(&enumerate_list(describe_items(&self.items), false))
        )
    }

    fn extract(&self, text: &str) -> ExtractionResult<Value> {
        let markers: Vec<String> = self.items.iter().map(Item::marker).collect();
        let first = markers[0].as_str();

        let Some((_, mut rest)) = text.split_once(first) else {
            return Ok(Value::List(Vec::new()));
        };

        let mut groups = Vec::new();
        loop {
            let (mut slices, tail) = split_sequence("repetition", &markers[1..], rest)?;
            let next = match tail.split_once(first) {
                Some((last, next)) => {
                    slices.push(last);
                    Some(next)
                }
                None => {
                    slices.push(tail);
                    None
                }
            };
            groups.push(Value::List(extract_items(&self.items, &slices)?));

            match next {
                Some(next) => rest = next,
                None => return Ok(Value::List(groups)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Data, ExtractionError};

    fn file_changes() -> Repetition {
        Repetition::new(
            "For every file you changed do the following",
            [Item::new("file"), Item::with("reason", Data::text("Explain the change"))],
        )
        .unwrap()
    }

    #[test]
    fn describes_group_template() {
        assert_eq!(
            file_changes().describe(),
            "For every file you changed do the following {\n  1. Write \"[[file]]\"\n  2. Write \"[[reason]]\"\n  3. Explain the change\n}"
        );
    }

    #[test]
    fn zero_repetitions_without_leading_marker() {
        let value = file_changes().extract("I did not change anything.").unwrap();
        assert_eq!(value, Value::List(Vec::new()));
    }

    #[test]
    fn extracts_n_groups_in_order() {
        for n in 1..=4 {
            let text: String = (0..n)
                .map(|i| format!("[[file]] src/{i}.rs [[reason]] fix {i}\n"))
                .collect();
            let groups = file_changes().extract(&text).unwrap().into_list().unwrap();

            assert_eq!(groups.len(), n);
            for (i, group) in groups.iter().enumerate() {
                assert_eq!(
                    group,
                    &Value::List(vec![format!("src/{i}.rs").into(), format!("fix {i}").into()])
                );
            }
        }
    }

    #[test]
    fn single_item_groups_split_on_recurrence() {
        let repetition = Repetition::new("List each idea", [Item::new("idea")]).unwrap();
        let value = repetition.extract("[[idea]] a [[idea]] b [[idea]] c").unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::List(vec!["a".into()]),
                Value::List(vec!["b".into()]),
                Value::List(vec!["c".into()]),
            ])
        );
    }

    #[test]
    fn incomplete_group_fails() {
        let err = file_changes().extract("[[file]] main.rs").unwrap_err();
        assert!(matches!(err, ExtractionError::MissingMarker { node: "repetition", .. }));
    }
}
