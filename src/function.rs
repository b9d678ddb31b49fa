#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Role of a function node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FunctionKind {
    Event,
    Condition,
    Action,

    /// A function evaluated for its return value inside a parameter
    Call,
}

impl FunctionKind {
    pub fn from_raw(raw: i32) -> Option<FunctionKind> {
        match raw {
            0 => Some(FunctionKind::Event),
            1 => Some(FunctionKind::Condition),
            2 => Some(FunctionKind::Action),
            3 => Some(FunctionKind::Call),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            FunctionKind::Event => 0,
            FunctionKind::Condition => 1,
            FunctionKind::Action => 2,
            FunctionKind::Call => 3,
        }
    }
}

/// A node in a trigger's event / condition / action tree
///
/// Control flow actions such as `IfThenElseMultiple` own their nested blocks
/// as `children`, where each child is tagged with the `branch` it belongs
/// to. Functions in a trigger's top level list and calls inside parameters
/// have no branch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Function {
    pub kind: FunctionKind,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub branch: Option<i32>,

    pub name: String,

    /// For calls this is the flag that announces the parameter list
    pub enabled: bool,

    pub parameters: Vec<Parameter>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<Function>,
}

impl Function {
    /// Branch holding the conditions of an if / then / else block (also the
    /// body of loops and the operands of and / or blocks)
    pub const BRANCH_CONDITION: i32 = 0;

    /// Branch executed when the conditions hold
    pub const BRANCH_THEN: i32 = 1;

    /// Branch executed when the conditions fail
    pub const BRANCH_ELSE: i32 = 2;

    /// Creates an enabled function without parameters
    pub fn new(kind: FunctionKind, name: impl Into<String>) -> Self {
        Function {
            kind,
            branch: None,
            name: name.into(),
            enabled: true,
            parameters: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn event(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Event, name)
    }

    pub fn condition(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Condition, name)
    }

    pub fn action(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Action, name)
    }

    pub fn call(name: impl Into<String>) -> Self {
        Function::new(FunctionKind::Call, name)
    }

    /// Appends a parameter
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Appends a child function to the given branch
    pub fn with_child(mut self, branch: i32, mut child: Function) -> Self {
        child.branch = Some(branch);
        self.children.push(child);
        self
    }

    /// Sets whether the function is enabled
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Child functions tagged with the given branch
    pub fn branch_children(&self, branch: i32) -> impl Iterator<Item = &Function> {
        self.children
            .iter()
            .filter(move |x| x.branch == Some(branch))
    }

    /// Visits this function and every function nested beneath it, including
    /// calls inside parameters, in file order
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Function)) {
        f(self);
        for param in &self.parameters {
            param.walk_functions(f);
        }

        for child in &self.children {
            child.walk(f);
        }
    }
}

/// A function argument
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Parameter {
    /// A named constant from the game's preset table (eg: `PlayerALL`)
    Preset { value: String },

    /// A reference to a variable by name, optionally indexed
    Variable {
        name: String,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        index: Option<Box<Parameter>>,
    },

    /// The result of a nested function
    Call { function: Box<Function> },

    /// A literal typed in by the map author
    String { value: String },
}

impl Parameter {
    pub fn preset(value: impl Into<String>) -> Self {
        Parameter::Preset {
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Parameter::Variable {
            name: name.into(),
            index: None,
        }
    }

    pub fn indexed(name: impl Into<String>, index: Parameter) -> Self {
        Parameter::Variable {
            name: name.into(),
            index: Some(Box::new(index)),
        }
    }

    pub fn call(function: Function) -> Self {
        Parameter::Call {
            function: Box::new(function),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Parameter::String {
            value: value.into(),
        }
    }

    /// The on-disk parameter tag
    pub fn tag(&self) -> i32 {
        match self {
            Parameter::Preset { .. } => 0,
            Parameter::Variable { .. } => 1,
            Parameter::Call { .. } => 2,
            Parameter::String { .. } => 3,
        }
    }

    /// The on-disk value string
    pub fn value(&self) -> &str {
        match self {
            Parameter::Preset { value } | Parameter::String { value } => value,
            Parameter::Variable { name, .. } => name,
            Parameter::Call { function } => &function.name,
        }
    }

    fn walk_functions<'a>(&'a self, f: &mut dyn FnMut(&'a Function)) {
        match self {
            Parameter::Call { function } => function.walk(f),
            Parameter::Variable {
                index: Some(index), ..
            } => index.walk_functions(f),
            _ => {}
        }
    }

    /// Visits this parameter and every parameter nested beneath it
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Parameter)) {
        f(self);
        match self {
            Parameter::Call { function } => {
                for param in &function.parameters {
                    param.walk(f);
                }
                for child in &function.children {
                    child.walk_parameters(f);
                }
            }
            Parameter::Variable {
                index: Some(index), ..
            } => index.walk(f),
            _ => {}
        }
    }
}

impl Function {
    /// Visits every parameter of this function and its descendants
    pub fn walk_parameters<'a>(&'a self, f: &mut dyn FnMut(&'a Parameter)) {
        for param in &self.parameters {
            param.walk(f);
        }

        for child in &self.children {
            child.walk_parameters(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn if_then_else() -> Function {
        Function::action("IfThenElseMultiple")
            .with_child(
                Function::BRANCH_CONDITION,
                Function::condition("OperatorCompareBoolean")
                    .with_param(Parameter::variable("flag"))
                    .with_param(Parameter::preset("OperatorEqualENE"))
                    .with_param(Parameter::preset("true")),
            )
            .with_child(
                Function::BRANCH_THEN,
                Function::action("SetVariable")
                    .with_param(Parameter::indexed("names", Parameter::string("1")))
                    .with_param(Parameter::string("hello")),
            )
            .with_child(Function::BRANCH_ELSE, Function::action("DoNothing"))
    }

    #[test]
    fn test_function_kind_raw() {
        for raw in 0..4 {
            assert_eq!(FunctionKind::from_raw(raw).map(|x| x.raw()), Some(raw));
        }
        assert_eq!(FunctionKind::from_raw(4), None);
        assert_eq!(FunctionKind::from_raw(-1), None);
    }

    #[test]
    fn test_branch_children() {
        let func = if_then_else();
        assert_eq!(func.branch_children(Function::BRANCH_CONDITION).count(), 1);
        assert_eq!(func.branch_children(Function::BRANCH_THEN).count(), 1);
        let els: Vec<_> = func
            .branch_children(Function::BRANCH_ELSE)
            .map(|x| x.name.as_str())
            .collect();
        assert_eq!(els, vec!["DoNothing"]);
    }

    #[test]
    fn test_walk_visits_nested() {
        let func = if_then_else();
        let mut names = Vec::new();
        func.walk(&mut |x| names.push(x.name.as_str()));
        assert_eq!(
            names,
            vec![
                "IfThenElseMultiple",
                "OperatorCompareBoolean",
                "SetVariable",
                "DoNothing"
            ]
        );

        let mut variables = Vec::new();
        func.walk_parameters(&mut |x| {
            if let Parameter::Variable { name, .. } = x {
                variables.push(name.as_str());
            }
        });
        assert_eq!(variables, vec!["flag", "names"]);
    }

    #[test]
    fn test_parameter_value() {
        let call = Parameter::call(Function::call("GetPlayersAll"));
        assert_eq!(call.tag(), 2);
        assert_eq!(call.value(), "GetPlayersAll");
        assert_eq!(Parameter::indexed("x", Parameter::string("0")).value(), "x");
    }
}
