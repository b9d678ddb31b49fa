use crate::{Category, Document};
use std::collections::{HashMap, HashSet};

/// Name of the category created when orphaned triggers have nowhere to go
pub const RECOVERED_CATEGORY: &str = "Recovered Triggers";

/// Category id given to triggers whose category never existed. Sequential
/// ids start at zero so it never matches a category.
const UNASSIGNED: i32 = -1;

/// What [`Document::repair`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repairs {
    /// Categories given a new id
    pub renumbered: usize,

    /// Triggers moved out of a missing category
    pub rehomed: usize,
}

impl Repairs {
    pub fn is_empty(&self) -> bool {
        self.renumbered == 0 && self.rehomed == 0
    }
}

/// Picks the category an orphaned trigger most likely came from by name:
/// initialization triggers go to an `Initialization` category, then a
/// category whose name appears in the trigger's name, then a category whose
/// name contains the trigger's first word
fn matching_category(trigger: &str, categories: &[Category]) -> Option<i32> {
    let trigger = trigger.to_lowercase();

    if trigger.starts_with("init ") || trigger == "initialization" {
        let init = categories
            .iter()
            .find(|x| x.name.eq_ignore_ascii_case("initialization"));
        if let Some(category) = init {
            return Some(category.id);
        }
    }

    let contained = categories.iter().find(|x| {
        let name = x.name.trim().to_lowercase();
        !name.is_empty() && trigger.contains(&name)
    });
    if let Some(category) = contained {
        return Some(category.id);
    }

    let prefix = trigger.split(' ').next().filter(|x| x.chars().count() > 3)?;
    categories
        .iter()
        .find(|x| x.name.to_lowercase().contains(prefix))
        .map(|x| x.id)
}

impl Document {
    /// Renumbers categories 0, 1, 2, ... in file order and points triggers at
    /// the new ids. Returns how many categories changed id.
    ///
    /// Where two categories shared an id, triggers follow the first. Triggers
    /// whose category never existed are left unassigned for
    /// [`Document::repair_orphans`].
    ///
    /// ```
    /// use wtg::{Category, Document, Trigger, Version};
    ///
    /// let mut doc = Document::new(Version::TFT);
    /// doc.push_category(Category::new(33554437, "Heroes"));
    /// doc.push_trigger(Trigger::new("Revive", 33554437));
    ///
    /// assert_eq!(doc.repair_category_ids(), 1);
    /// assert_eq!(doc.triggers()[0].category, 0);
    /// ```
    pub fn repair_category_ids(&mut self) -> usize {
        let mut renamed = HashMap::new();
        let mut result = 0;
        for (i, category) in self.categories_mut().iter_mut().enumerate() {
            let id = i as i32;
            renamed.entry(category.id).or_insert(id);
            if category.id != id {
                log::debug!("category `{}`: id {} -> {}", category.name, category.id, id);
                category.id = id;
                result += 1;
            }
        }

        for trigger in self.triggers_mut() {
            trigger.category = renamed.get(&trigger.category).copied().unwrap_or(UNASSIGNED);
        }

        result
    }

    /// Moves every trigger whose category does not exist into the category
    /// its name matches best, falling back to the first category. A
    /// [`RECOVERED_CATEGORY`] is created when the document has none. Returns
    /// how many triggers moved.
    ///
    /// ```
    /// use wtg::{Category, Document, Trigger, Version};
    ///
    /// let mut doc = Document::new(Version::TFT);
    /// doc.push_category(Category::new(0, "Initialization"));
    /// doc.push_category(Category::new(1, "Heroes"));
    /// doc.push_trigger(Trigger::new("Revive Heroes", 7));
    ///
    /// assert_eq!(doc.repair_orphans(), 1);
    /// assert_eq!(doc.triggers()[0].category, 1);
    /// ```
    pub fn repair_orphans(&mut self) -> usize {
        let known: HashSet<i32> = self.categories().iter().map(|x| x.id).collect();
        let orphans: Vec<usize> = (0..self.triggers().len())
            .filter(|&i| !known.contains(&self.triggers()[i].category))
            .collect();

        if orphans.is_empty() {
            return 0;
        }

        let fallback = match self.categories().first() {
            Some(category) => category.id,
            None => {
                self.push_category(Category::new(0, RECOVERED_CATEGORY));
                0
            }
        };

        for &i in &orphans {
            let id = matching_category(&self.triggers()[i].name, self.categories())
                .unwrap_or(fallback);
            let trigger = &mut self.triggers_mut()[i];
            log::debug!("trigger `{}`: category {} -> {}", trigger.name, trigger.category, id);
            trigger.category = id;
        }

        orphans.len()
    }

    /// Renumbers categories and then rehomes orphaned triggers so that every
    /// trigger references an existing category
    pub fn repair(&mut self) -> Repairs {
        let renumbered = self.repair_category_ids();
        let rehomed = self.repair_orphans();
        Repairs {
            renumbered,
            rehomed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Trigger, Version};

    fn categories(doc: &Document) -> Vec<(i32, &str)> {
        doc.categories()
            .iter()
            .map(|x| (x.id, x.name.as_str()))
            .collect()
    }

    fn placements(doc: &Document) -> Vec<i32> {
        doc.triggers().iter().map(|x| x.category).collect()
    }

    #[test]
    fn test_repair_category_ids() {
        let mut doc = Document::new(Version::TFT);
        doc.push_category(Category::new(5, "Initialization"));
        doc.push_category(Category::new(0x0200_0003, "Heroes"));
        doc.push_category(Category::new(2, "Waves"));
        doc.push_trigger(Trigger::new("Revive", 0x0200_0003));
        doc.push_trigger(Trigger::new("Spawn", 2));
        doc.push_trigger(Trigger::new("Setup", 5));
        doc.push_trigger(Trigger::new("Lost", 1));

        assert_eq!(doc.repair_category_ids(), 2);
        assert_eq!(
            categories(&doc),
            vec![(0, "Initialization"), (1, "Heroes"), (2, "Waves")]
        );
        assert_eq!(placements(&doc), vec![1, 2, 0, -1]);
    }

    #[test]
    fn test_repair_category_ids_shared_id() {
        let mut doc = Document::new(Version::TFT);
        doc.push_category(Category::new(4, "First"));
        doc.push_category(Category::new(4, "Second"));
        doc.push_trigger(Trigger::new("Setup", 4));

        assert_eq!(doc.repair_category_ids(), 2);
        assert_eq!(categories(&doc), vec![(0, "First"), (1, "Second")]);
        assert_eq!(placements(&doc), vec![0]);
    }

    #[test]
    fn test_sequential_ids_are_kept() {
        let mut doc = Document::new(Version::TFT);
        doc.push_category(Category::new(0, "Initialization"));
        doc.push_category(Category::new(1, "Heroes"));
        doc.push_trigger(Trigger::new("Revive", 1));
        let before = doc.clone();

        assert_eq!(doc.repair_category_ids(), 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_repair_orphans_by_name() {
        let mut doc = Document::new(Version::TFT);
        doc.push_category(Category::new(0, "General"));
        doc.push_category(Category::new(1, "Initialization"));
        doc.push_category(Category::new(2, "Heroes"));
        doc.push_category(Category::new(3, "Spawn Waves"));
        for name in ["Init Bosses", "Revive Heroes", "Spawn Timer", "Misc", "Initialization"] {
            doc.push_trigger(Trigger::new(name, 9));
        }
        doc.push_trigger(Trigger::new("Hero Setup", 1));

        assert_eq!(doc.repair_orphans(), 5);
        assert_eq!(placements(&doc), vec![1, 2, 3, 0, 1, 1]);
        assert!(doc.verify().is_ok());
        assert_eq!(doc.repair_orphans(), 0);
    }

    #[test]
    fn test_repair_orphans_without_categories() {
        let mut doc = Document::new(Version::ROC);
        doc.push_trigger(Trigger::new("Setup", 3));
        doc.push_trigger(Trigger::new("Tick", -1));

        assert_eq!(doc.repair_orphans(), 2);
        assert_eq!(categories(&doc), vec![(0, RECOVERED_CATEGORY)]);
        assert_eq!(placements(&doc), vec![0, 0]);
    }

    #[test]
    fn test_repair() {
        let mut doc = Document::new(Version::TFT);
        doc.push_category(Category::new(1200, "Initialization"));
        doc.push_category(Category::new(1201, "Heroes"));
        doc.push_trigger(Trigger::new("Melee Initialization", 1200));
        doc.push_trigger(Trigger::new("Revive Heroes", 77));
        assert!(doc.verify().is_err());

        let repairs = doc.repair();
        assert_eq!(
            repairs,
            Repairs {
                renumbered: 2,
                rehomed: 1
            }
        );
        assert_eq!(placements(&doc), vec![0, 1]);
        assert!(doc.verify().is_ok());
        assert!(doc.repair().is_empty());
    }
}
