use crate::{
    errors::{Error, Malformed},
    Document, Function, FunctionKind, FunctionResolver, Parameter, Signature, Trigger,
};
use std::{
    collections::{HashMap, HashSet},
    fmt,
};

/// Prefix of globals the editor generates for placed objects (units,
/// regions, cameras, triggers, ...). They are never declared as variables.
pub const GENERATED_GLOBAL_PREFIX: &str = "gg_";

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A problem found while inspecting a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Number of parameters the function is written with. A call's enabled flag
/// announces its parameter list, so disabled calls carry none.
pub(crate) fn expected_arity(function: &Function, signature: &Signature) -> usize {
    if function.kind == FunctionKind::Call && !function.enabled {
        0
    } else {
        signature.arity()
    }
}

fn variable_refs(trigger: &Trigger) -> Vec<&str> {
    let mut result = Vec::new();
    for function in &trigger.functions {
        function.walk_parameters(&mut |param| {
            if let Parameter::Variable { name, .. } = param {
                result.push(name.as_str());
            }
        });
    }
    result
}

impl Document {
    /// Checks that every trigger's category exists and that every variable
    /// parameter names a declared variable or a generated global
    ///
    /// ```
    /// use wtg::{Document, Trigger, Version};
    ///
    /// let mut doc = Document::new(Version::TFT);
    /// doc.push_trigger(Trigger::new("Orphan", 3));
    /// assert!(doc.verify().is_err());
    /// ```
    pub fn verify(&self) -> Result<(), Error> {
        let categories: HashSet<i32> = self.categories().iter().map(|x| x.id).collect();
        for trigger in self.triggers() {
            if !categories.contains(&trigger.category) {
                return Err(Error::malformed(
                    None,
                    Malformed::DanglingCategory {
                        trigger: trigger.name.clone(),
                        category: trigger.category,
                    },
                ));
            }

            let missing = variable_refs(trigger)
                .into_iter()
                .find(|x| self.variable(x).is_none() && !x.starts_with(GENERATED_GLOBAL_PREFIX));
            if let Some(variable) = missing {
                return Err(Error::malformed(
                    None,
                    Malformed::DanglingVariable {
                        trigger: trigger.name.clone(),
                        variable: variable.to_owned(),
                    },
                ));
            }
        }

        Ok(())
    }

    /// Inspects the document for anything the editor would reject or that
    /// likely indicates a damaged file. Errors come before warnings.
    pub fn diagnose<R>(&self, resolver: &R) -> Vec<Diagnostic>
    where
        R: FunctionResolver + ?Sized,
    {
        let mut result = Vec::new();

        let mut category_ids = HashSet::new();
        let mut category_names = HashSet::new();
        for category in self.categories() {
            if !category_ids.insert(category.id) {
                result.push(Diagnostic::error(format!(
                    "duplicate category id {} (`{}`)",
                    category.id, category.name
                )));
            }

            if category.name.trim().is_empty() {
                result.push(Diagnostic::error(format!(
                    "category {} has an empty name",
                    category.id
                )));
            } else if !category_names.insert(category.name.as_str()) {
                result.push(Diagnostic::warning(format!(
                    "duplicate category name `{}`",
                    category.name
                )));
            }
        }

        let mut trigger_names = HashSet::new();
        let mut used_variables = HashSet::new();
        for (i, trigger) in self.triggers().iter().enumerate() {
            if trigger.name.trim().is_empty() {
                result.push(Diagnostic::error(format!("trigger #{} has an empty name", i)));
            } else if !trigger_names.insert(trigger.name.as_str()) {
                result.push(Diagnostic::warning(format!(
                    "duplicate trigger name `{}`",
                    trigger.name
                )));
            }

            if !category_ids.contains(&trigger.category) {
                result.push(Diagnostic::error(format!(
                    "trigger `{}` references missing category {}",
                    trigger.name, trigger.category
                )));
            }

            if trigger.functions.is_empty() && !trigger.is_comment && !trigger.custom_text {
                result.push(Diagnostic::warning(format!(
                    "trigger `{}` has no functions",
                    trigger.name
                )));
            }

            for name in variable_refs(trigger) {
                if self.variable(name).is_some() {
                    used_variables.insert(name);
                } else if !name.starts_with(GENERATED_GLOBAL_PREFIX) {
                    result.push(Diagnostic::error(format!(
                        "trigger `{}` references undefined variable `{}`",
                        trigger.name, name
                    )));
                }
            }

            for function in &trigger.functions {
                function.walk(&mut |f| self.check_signature(trigger, f, resolver, &mut result));
            }
        }

        for variable in self.variables() {
            if !used_variables.contains(variable.name.as_str()) {
                result.push(Diagnostic::warning(format!(
                    "variable `{}` is never used",
                    variable.name
                )));
            }
        }

        result.sort_by(|a, b| b.severity.cmp(&a.severity));
        result
    }

    fn check_signature<R>(
        &self,
        trigger: &Trigger,
        function: &Function,
        resolver: &R,
        out: &mut Vec<Diagnostic>,
    ) where
        R: FunctionResolver + ?Sized,
    {
        let Some(signature) = resolver.resolve(function.kind, &function.name) else {
            out.push(Diagnostic::error(format!(
                "trigger `{}` uses unknown function `{}`",
                trigger.name, function.name
            )));
            return;
        };

        if function.parameters.len() != expected_arity(function, signature) {
            out.push(Diagnostic::error(format!(
                "trigger `{}`: `{}` takes {} parameters but has {}",
                trigger.name,
                function.name,
                signature.arity(),
                function.parameters.len()
            )));
        }

        let mut mismatched = HashMap::new();
        for (param, expected) in function.parameters.iter().zip(signature.params()) {
            let Parameter::Variable { name, index } = param else {
                continue;
            };

            let Some(variable) = self.variable(name) else {
                continue;
            };

            // Expected types outside the variable type set (eg: AnyGlobal)
            // accept anything
            let actual = variable.ty.as_str();
            let is_type_name = self.variables().any(|x| x.ty.as_str() == expected.as_str())
                || matches!(expected.as_str(), "integer" | "real" | "boolean" | "string");
            if is_type_name && actual != expected && (index.is_some() || !variable.is_array) {
                mismatched.insert(name.as_str(), (actual, expected.as_str()));
            }
        }

        let mut mismatched: Vec<_> = mismatched.into_iter().collect();
        mismatched.sort();
        for (name, (actual, expected)) in mismatched {
            out.push(Diagnostic::warning(format!(
                "trigger `{}`: `{}` expects {} but variable `{}` is {}",
                trigger.name, function.name, expected, name, actual
            )));
        }
    }
}
