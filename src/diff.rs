use crate::{Category, Document, Trigger, Variable};
use std::{collections::HashMap, fmt};

/// Names that were added, removed, or changed in one entity list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl Changes {
    fn between<'a, T, I, J>(old: I, new: J, name: fn(&T) -> &str) -> Changes
    where
        T: PartialEq + 'a,
        I: Iterator<Item = &'a T>,
        J: Iterator<Item = &'a T>,
    {
        let old: Vec<&T> = old.collect();
        let new: Vec<&T> = new.collect();

        // Duplicate names compare their first occurrence
        let mut old_by_name = HashMap::new();
        for x in &old {
            old_by_name.entry(name(x)).or_insert(*x);
        }

        let mut new_by_name = HashMap::new();
        for x in &new {
            new_by_name.entry(name(x)).or_insert(*x);
        }

        let mut result = Changes::default();
        for x in &new {
            let key = name(x);
            if !std::ptr::eq(new_by_name[key], *x) {
                continue;
            }

            match old_by_name.get(key) {
                None => result.added.push(key.to_owned()),
                Some(prev) if *prev != *x => result.changed.push(key.to_owned()),
                Some(_) => {}
            }
        }

        for x in &old {
            let key = name(x);
            if std::ptr::eq(old_by_name[key], *x) && !new_by_name.contains_key(key) {
                result.removed.push(key.to_owned());
            }
        }

        result
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Differences between two documents, matched by name
///
/// ```
/// use wtg::{Document, DocumentDiff, Variable, Version};
///
/// let old = Document::new(Version::TFT);
/// let mut new = old.clone();
/// new.insert_variable(Variable::new("gold", "integer"));
///
/// let diff = DocumentDiff::between(&old, &new);
/// assert_eq!(diff.variables.added, vec!["gold"]);
/// assert!(diff.triggers.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentDiff {
    pub version: Option<(i32, i32)>,
    pub categories: Changes,
    pub variables: Changes,
    pub triggers: Changes,
}

impl DocumentDiff {
    pub fn between(old: &Document, new: &Document) -> Self {
        DocumentDiff {
            version: (old.version() != new.version())
                .then(|| (old.version().raw(), new.version().raw())),
            categories: Changes::between(
                old.categories().iter(),
                new.categories().iter(),
                |x: &Category| x.name.as_str(),
            ),
            variables: Changes::between(old.variables(), new.variables(), |x: &Variable| {
                x.name.as_str()
            }),
            triggers: Changes::between(
                old.triggers().iter(),
                new.triggers().iter(),
                |x: &Trigger| x.name.as_str(),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.categories.is_empty()
            && self.variables.is_empty()
            && self.triggers.is_empty()
    }
}

fn write_changes(f: &mut fmt::Formatter<'_>, title: &str, changes: &Changes) -> fmt::Result {
    if changes.is_empty() {
        return Ok(());
    }

    writeln!(f, "{}:", title)?;
    for x in &changes.added {
        writeln!(f, "  + {}", x)?;
    }
    for x in &changes.removed {
        writeln!(f, "  - {}", x)?;
    }
    for x in &changes.changed {
        writeln!(f, "  ~ {}", x)?;
    }
    Ok(())
}

impl fmt::Display for DocumentDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "no differences");
        }

        if let Some((old, new)) = self.version {
            writeln!(f, "version: {} -> {}", old, new)?;
        }

        write_changes(f, "categories", &self.categories)?;
        write_changes(f, "variables", &self.variables)?;
        write_changes(f, "triggers", &self.triggers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Function, Version};

    #[test]
    fn test_diff() {
        let mut old = Document::new(Version::TFT);
        old.push_category(Category::new(0, "Init"));
        old.insert_variable(Variable::new("a", "integer"));
        old.insert_variable(Variable::new("b", "integer"));
        old.push_trigger(Trigger::new("Setup", 0));
        old.push_trigger(Trigger::new("Spawn", 0));

        let mut new = old.clone();
        new.set_version(Version::ROC);
        new.remove_variable("a");
        new.insert_variable(Variable::new("b", "real"));
        new.insert_variable(Variable::new("c", "unit"));
        new.triggers_mut()[0]
            .functions
            .push(Function::action("DoNothing"));
        new.push_category(Category::new(1, "Combat"));

        let diff = DocumentDiff::between(&old, &new);
        assert_eq!(diff.version, Some((7, 4)));
        assert_eq!(diff.categories.added, vec!["Combat"]);
        assert_eq!(diff.variables.added, vec!["c"]);
        assert_eq!(diff.variables.removed, vec!["a"]);
        assert_eq!(diff.variables.changed, vec!["b"]);
        assert_eq!(diff.triggers.changed, vec!["Setup"]);
        assert!(diff.triggers.added.is_empty());

        let expected = "\
version: 7 -> 4
categories:
  + Combat
variables:
  + c
  - a
  ~ b
triggers:
  ~ Setup
";
        assert_eq!(diff.to_string(), expected);
    }

    #[test]
    fn test_no_differences() {
        let doc = Document::new(Version::TFT);
        let diff = DocumentDiff::between(&doc, &doc);
        assert!(diff.is_empty());
        assert_eq!(diff.to_string(), "no differences\n");
    }
}
