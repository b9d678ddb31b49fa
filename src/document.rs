use crate::{Function, FunctionKind, Version};
use indexmap::IndexMap;
use std::{
    convert::Infallible,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The decoded contents of a trigger file
///
/// The document owns every category, variable, and trigger. Triggers refer to
/// their category by id and parameters refer to variables by name so there
/// are no links between the owned values.
///
/// Variables are keyed by name and keep their insertion order, which is the
/// order they are written in.
///
/// ```
/// use wtg::{Category, Document, Trigger, Variable, VariableType, Version};
///
/// let mut doc = Document::new(Version::TFT);
/// doc.push_category(Category::new(0, "Initialization"));
/// doc.insert_variable(Variable::new("gold", VariableType::Integer));
/// doc.push_trigger(Trigger::new("Melee Initialization", 0));
///
/// assert_eq!(doc.variable("gold").map(|x| &x.ty), Some(&VariableType::Integer));
/// assert_eq!(doc.triggers().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    version: Version,
    game_version: i32,
    categories: Vec<Category>,
    variables: IndexMap<String, Variable>,
    triggers: Vec<Trigger>,
}

impl Document {
    /// Value written by the editor into the unlabeled field between the
    /// categories and variables
    pub const DEFAULT_GAME_VERSION: i32 = 2;

    /// Creates an empty document
    pub fn new(version: Version) -> Self {
        Document {
            version,
            game_version: Self::DEFAULT_GAME_VERSION,
            categories: Vec::new(),
            variables: IndexMap::new(),
            triggers: Vec::new(),
        }
    }

    /// Format version the document was read from or created for
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn game_version(&self) -> i32 {
        self.game_version
    }

    pub fn set_game_version(&mut self, game_version: i32) {
        self.game_version = game_version;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut Vec<Category> {
        &mut self.categories
    }

    pub fn push_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    /// Find a category by id
    pub fn category(&self, id: i32) -> Option<&Category> {
        self.categories.iter().find(|x| x.id == id)
    }

    /// Variables in file order
    pub fn variables(&self) -> impl ExactSizeIterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Inserts a variable keyed by its name. Replacing an existing variable
    /// keeps its position and returns the old value.
    pub fn insert_variable(&mut self, mut variable: Variable) -> Option<Variable> {
        if let VariableType::Handle(x) = &mut variable.ty {
            variable.ty = VariableType::from(std::mem::take(x));
        }
        self.variables.insert(variable.name.clone(), variable)
    }

    /// Removes a variable, preserving the order of the rest
    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.shift_remove(name)
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn triggers_mut(&mut self) -> &mut Vec<Trigger> {
        &mut self.triggers
    }

    pub fn push_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    /// Triggers that belong to the given category, in file order
    pub fn triggers_in(&self, category: i32) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter().filter(move |x| x.category == category)
    }
}

/// A folder grouping triggers in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Category {
    pub id: i32,
    pub name: String,

    /// Comment categories are shown as notes rather than folders
    pub is_comment: bool,
}

impl Category {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Category {
            id,
            name: name.into(),
            is_comment: false,
        }
    }
}

/// The declared type of a variable
///
/// The four primitive types are distinguished and everything else (units,
/// players, timers, ...) is carried by name. Types compare by their on-disk
/// name, so a `Handle` spelling out a primitive equals that primitive.
///
/// ```
/// use wtg::VariableType;
///
/// let ty: VariableType = "real".parse().unwrap();
/// assert_eq!(ty, VariableType::Real);
/// assert_eq!(VariableType::from("unit").as_str(), "unit");
/// assert_eq!(VariableType::Handle("integer".into()), VariableType::Integer);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum VariableType {
    Integer,
    Real,
    Boolean,
    String,
    Handle(String),
}

impl VariableType {
    pub fn as_str(&self) -> &str {
        match self {
            VariableType::Integer => "integer",
            VariableType::Real => "real",
            VariableType::Boolean => "boolean",
            VariableType::String => "string",
            VariableType::Handle(x) => x.as_str(),
        }
    }
}

impl PartialEq for VariableType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for VariableType {}

impl Hash for VariableType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for VariableType {
    fn from(value: &str) -> Self {
        match value {
            "integer" => VariableType::Integer,
            "real" => VariableType::Real,
            "boolean" => VariableType::Boolean,
            "string" => VariableType::String,
            x => VariableType::Handle(x.to_owned()),
        }
    }
}

impl From<String> for VariableType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "integer" | "real" | "boolean" | "string" => VariableType::from(value.as_str()),
            _ => VariableType::Handle(value),
        }
    }
}

impl From<VariableType> for String {
    fn from(value: VariableType) -> Self {
        match value {
            VariableType::Handle(x) => x,
            x => x.as_str().to_owned(),
        }
    }
}

impl FromStr for VariableType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(VariableType::from(s))
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user defined global variable
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    pub name: String,

    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: VariableType,

    /// Scope flag, always set by the editor
    pub global: bool,

    pub is_array: bool,

    /// Number of array slots. Layouts without array sizes always read 1.
    pub array_size: i32,

    /// `None` when the variable is not initialized
    pub initial_value: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: impl Into<VariableType>) -> Self {
        Variable {
            name: name.into(),
            ty: ty.into(),
            global: true,
            is_array: false,
            array_size: 1,
            initial_value: None,
        }
    }

    /// Marks the variable as an array with the given number of slots
    pub fn array(mut self, size: i32) -> Self {
        self.is_array = true;
        self.array_size = size;
        self
    }

    pub fn initial(mut self, value: impl Into<String>) -> Self {
        self.initial_value = Some(value.into());
        self
    }
}

/// A named event / condition / action script
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trigger {
    pub name: String,
    pub description: String,
    pub is_comment: bool,
    pub enabled: bool,

    /// The trigger has been converted to custom script text
    pub custom_text: bool,

    pub initially_on: bool,
    pub run_on_map_init: bool,

    /// Id of the owning category
    pub category: i32,

    /// Events, conditions, and actions in file order
    pub functions: Vec<Function>,
}

impl Trigger {
    /// Creates an enabled, initially on trigger with no functions
    pub fn new(name: impl Into<String>, category: i32) -> Self {
        Trigger {
            name: name.into(),
            description: String::new(),
            is_comment: false,
            enabled: true,
            custom_text: false,
            initially_on: true,
            run_on_map_init: false,
            category,
            functions: Vec::new(),
        }
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    fn of_kind(&self, kind: FunctionKind) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(move |x| x.kind == kind)
    }

    pub fn events(&self) -> impl Iterator<Item = &Function> {
        self.of_kind(FunctionKind::Event)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Function> {
        self.of_kind(FunctionKind::Condition)
    }

    pub fn actions(&self) -> impl Iterator<Item = &Function> {
        self.of_kind(FunctionKind::Action)
    }
}
