use crate::Document;
use std::fmt;

/// Entity counts plus a bounded preview of the variables
///
/// ```
/// use wtg::{Document, Summary, Variable, Version};
///
/// let mut doc = Document::new(Version::TFT);
/// doc.insert_variable(Variable::new("gold", "integer"));
/// let text = Summary::new(&doc).to_string();
/// assert!(text.contains("Variables: 1\n"));
/// assert!(text.contains("    gold (integer)\n"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    doc: &'a Document,
    preview: usize,
}

impl<'a> Summary<'a> {
    pub const DEFAULT_PREVIEW: usize = 10;

    pub fn new(doc: &'a Document) -> Self {
        Summary {
            doc,
            preview: Self::DEFAULT_PREVIEW,
        }
    }

    /// Number of variables listed before the rest are elided
    pub fn preview(mut self, preview: usize) -> Self {
        self.preview = preview;
        self
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.doc;
        writeln!(f, "  Format version: {}", doc.version())?;
        writeln!(f, "  Variables: {}", doc.variable_count())?;
        writeln!(f, "  Triggers: {}", doc.triggers().len())?;
        writeln!(f, "  Categories: {}", doc.categories().len())?;

        for variable in doc.variables().take(self.preview) {
            writeln!(f, "    {} ({})", variable.name, variable.ty)?;
        }

        let rest = doc.variable_count().saturating_sub(self.preview);
        if rest > 0 {
            writeln!(f, "    ... and {} more", rest)?;
        }

        Ok(())
    }
}

/// The category tree with the triggers filed under each category
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    doc: &'a Document,
}

impl<'a> Listing<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Listing { doc }
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.doc;
        writeln!(f, "Format version: {}", doc.version())?;
        writeln!(f, "Game version: {}", doc.game_version())?;

        writeln!(f, "Variables ({}):", doc.variable_count())?;
        for variable in doc.variables() {
            write!(f, "  - {}: {}", variable.name, variable.ty)?;
            if variable.is_array {
                write!(f, "[{}]", variable.array_size)?;
            }
            if let Some(value) = &variable.initial_value {
                write!(f, " = {:?}", value)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Categories ({}):", doc.categories().len())?;
        for category in doc.categories() {
            let comment = if category.is_comment { " (comment)" } else { "" };
            writeln!(f, "  [{}] {}{}", category.id, category.name, comment)?;
            for trigger in doc.triggers_in(category.id) {
                write!(f, "    • {}", trigger.name)?;
                if !trigger.enabled {
                    write!(f, " (disabled)")?;
                }
                if trigger.is_comment {
                    write!(f, " (comment)")?;
                }
                if trigger.custom_text {
                    write!(f, " (custom text)")?;
                }
                if trigger.run_on_map_init {
                    write!(f, " (map init)")?;
                }
                writeln!(
                    f,
                    ": {} events, {} conditions, {} actions",
                    trigger.events().count(),
                    trigger.conditions().count(),
                    trigger.actions().count()
                )?;
            }
        }

        let orphans: Vec<_> = doc
            .triggers()
            .iter()
            .filter(|x| doc.category(x.category).is_none())
            .collect();
        if !orphans.is_empty() {
            writeln!(f, "Uncategorized ({}):", orphans.len())?;
            for trigger in orphans {
                writeln!(f, "    • {} (category {})", trigger.name, trigger.category)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Function, Trigger, Variable, Version};

    #[test]
    fn test_summary_preview_is_bounded() {
        let mut doc = Document::new(Version::TFT);
        for i in 0..12 {
            doc.insert_variable(Variable::new(format!("v{}", i), "integer"));
        }

        let text = Summary::new(&doc).to_string();
        assert!(text.contains("  Variables: 12\n"));
        assert_eq!(text.matches(" (integer)\n").count(), 10);
        assert!(text.ends_with("    v9 (integer)\n    ... and 2 more\n"));

        let text = Summary::new(&doc).preview(12).to_string();
        assert!(!text.contains("more"));
    }

    #[test]
    fn test_listing() {
        let mut doc = Document::new(Version::TFT);
        doc.push_category(Category::new(0, "Init"));
        doc.insert_variable(Variable::new("names", "string").array(2).initial("x"));
        let mut trigger = Trigger::new("Setup", 0)
            .with_function(Function::event("MapInitializationEvent"))
            .with_function(Function::action("DoNothing"));
        trigger.run_on_map_init = true;
        doc.push_trigger(trigger);
        doc.push_trigger(Trigger::new("Lost", 5));

        let expected = "\
Format version: 7
Game version: 2
Variables (1):
  - names: string[2] = \"x\"
Categories (1):
  [0] Init
    • Setup (map init): 1 events, 0 conditions, 1 actions
Uncategorized (1):
    • Lost (category 5)
";
        assert_eq!(Listing::new(&doc).to_string(), expected);
    }
}
