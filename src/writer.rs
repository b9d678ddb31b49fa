use crate::{
    errors::{Error, ErrorKind},
    reader::MAGIC,
    validate::expected_arity,
    Document, Function, FunctionKind, FunctionResolver, Layout, Parameter, Version,
};
use std::io::Write;

/// Encodes a [Document] into the byte layout of a format version
///
/// Encoding is all or nothing: the whole document is checked and laid out in
/// memory before anything is handed to a writer, so a construct the target
/// layout can't express never leaves a partial file behind.
///
/// ```
/// use wtg::{Document, Encoder, Version};
///
/// let doc = Document::new(Version::TFT);
/// let data = Encoder::new().encode(&doc)?;
/// assert_eq!(&data[..4], b"WTG!");
/// assert_eq!(data.len(), 4 + 4 * 5);
///
/// let err = Encoder::with_version(Version::new(5)).encode(&doc).unwrap_err();
/// assert!(matches!(err.kind(), wtg::ErrorKind::UnsupportedVersion { version: 5 }));
/// # Ok::<(), wtg::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    version: Option<Version>,
}

impl Encoder {
    /// Encoder that writes each document in the version it carries
    pub fn new() -> Self {
        Encoder { version: None }
    }

    /// Encoder that writes every document in the given version
    pub fn with_version(version: Version) -> Self {
        Encoder {
            version: Some(version),
        }
    }

    /// Encode the document into a new buffer
    pub fn encode(&self, doc: &Document) -> Result<Vec<u8>, Error> {
        let version = self.version.unwrap_or_else(|| doc.version());
        let layout = Layout::lookup(version).ok_or_else(|| {
            Error::new(ErrorKind::UnsupportedVersion {
                version: version.raw(),
            })
        })?;

        log::debug!("encoding trigger file version {}", version);
        let mut writer = ByteWriter {
            out: Vec::new(),
            layout,
        };
        writer.write_document(doc)?;
        log::debug!("encoded {} bytes", writer.out.len());
        Ok(writer.out)
    }

    /// Encode the document after checking every function's parameter count
    /// against the resolver the file will be read back with. The file does
    /// not record parameter counts, so a mismatch would encode cleanly and
    /// then fail to decode.
    ///
    /// ```
    /// use wtg::{Document, Encoder, Function, Trigger, TriggerData, Category, Version};
    ///
    /// let mut doc = Document::new(Version::TFT);
    /// doc.push_category(Category::new(0, "Init"));
    /// doc.push_trigger(Trigger::new("Setup", 0).with_function(Function::action("DoNothing")));
    ///
    /// let data = TriggerData::from_text(b"[TriggerActions]\nDoNothing=0,nothing\n").unwrap();
    /// assert!(Encoder::new().encode_resolved(&doc, &data).is_ok());
    /// assert!(Encoder::new().encode_resolved(&doc, &TriggerData::new()).is_err());
    /// ```
    pub fn encode_resolved<R>(&self, doc: &Document, resolver: &R) -> Result<Vec<u8>, Error>
    where
        R: FunctionResolver + ?Sized,
    {
        let version = self.version.unwrap_or_else(|| doc.version()).raw();
        for trigger in doc.triggers() {
            for function in &trigger.functions {
                let mut result = Ok(());
                function.walk(&mut |f| {
                    if result.is_ok() {
                        result = check_arity(f, resolver, version);
                    }
                });
                result?;
            }
        }

        self.encode(doc)
    }

    /// Encode the document and write it out
    pub fn encode_to<W>(&self, doc: &Document, mut writer: W) -> Result<(), Error>
    where
        W: Write,
    {
        let data = self.encode(doc)?;
        writer.write_all(&data)?;
        Ok(())
    }
}

impl Document {
    /// Encode the document in the version it carries
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        Encoder::new().encode(self)
    }
}

fn check_arity<R>(function: &Function, resolver: &R, version: i32) -> Result<(), Error>
where
    R: FunctionResolver + ?Sized,
{
    let signature = resolver.resolve(function.kind, &function.name).ok_or_else(|| {
        Error::unrepresentable(version, format!("unknown function `{}`", function.name))
    })?;

    let expected = expected_arity(function, signature);
    if function.parameters.len() != expected {
        return Err(Error::unrepresentable(
            version,
            format!(
                "`{}` with {} parameters instead of {}",
                function.name,
                function.parameters.len(),
                expected
            ),
        ));
    }

    Ok(())
}

struct ByteWriter {
    out: Vec<u8>,
    layout: &'static Layout,
}

impl ByteWriter {
    fn version(&self) -> i32 {
        self.layout.version.raw()
    }

    fn unrepresentable(&self, what: impl Into<String>) -> Error {
        Error::unrepresentable(self.version(), what)
    }

    #[inline]
    fn write_i32(&mut self, x: i32) {
        self.out.extend_from_slice(&x.to_le_bytes());
    }

    #[inline]
    fn write_bool(&mut self, x: bool) {
        self.write_i32(i32::from(x));
    }

    fn write_count(&mut self, len: usize, what: &str) -> Result<(), Error> {
        let count = i32::try_from(len)
            .map_err(|_| self.unrepresentable(format!("{} {}", len, what)))?;
        self.write_i32(count);
        Ok(())
    }

    fn write_string(&mut self, x: &str) -> Result<(), Error> {
        if x.as_bytes().contains(&0) {
            return Err(self.unrepresentable(format!("string with a NUL byte ({:?})", x)));
        }

        self.out.extend_from_slice(x.as_bytes());
        self.out.push(0);
        Ok(())
    }

    fn write_document(&mut self, doc: &Document) -> Result<(), Error> {
        self.out.extend_from_slice(&MAGIC);
        self.write_i32(self.version());

        self.write_count(doc.categories().len(), "categories")?;
        for category in doc.categories() {
            self.write_i32(category.id);
            self.write_string(&category.name)?;
            if self.layout.category_comments {
                self.write_bool(category.is_comment);
            } else if category.is_comment {
                return Err(
                    self.unrepresentable(format!("comment category `{}`", category.name))
                );
            }
        }

        self.write_i32(doc.game_version());

        self.write_count(doc.variable_count(), "variables")?;
        for variable in doc.variables() {
            self.write_string(&variable.name)?;
            self.write_string(variable.ty.as_str())?;
            self.write_bool(variable.global);
            self.write_bool(variable.is_array);
            if self.layout.array_sizes {
                self.write_i32(variable.array_size);
            } else if variable.array_size != Layout::IMPLICIT_ARRAY_SIZE {
                return Err(self.unrepresentable(format!(
                    "array size {} of variable `{}`",
                    variable.array_size, variable.name
                )));
            }

            self.write_bool(variable.initial_value.is_some());
            self.write_string(variable.initial_value.as_deref().unwrap_or(""))?;
        }

        self.write_count(doc.triggers().len(), "triggers")?;
        for trigger in doc.triggers() {
            self.write_string(&trigger.name)?;
            self.write_string(&trigger.description)?;
            if self.layout.trigger_comments {
                self.write_bool(trigger.is_comment);
            } else if trigger.is_comment {
                return Err(self.unrepresentable(format!("comment trigger `{}`", trigger.name)));
            }

            self.write_bool(trigger.enabled);
            self.write_bool(trigger.custom_text);
            self.write_bool(!trigger.initially_on);
            self.write_bool(trigger.run_on_map_init);
            self.write_i32(trigger.category);
            self.write_functions(&trigger.functions, false)?;
        }

        Ok(())
    }

    fn write_functions(&mut self, functions: &[Function], child: bool) -> Result<(), Error> {
        self.write_count(functions.len(), "functions")?;
        for function in functions {
            self.write_function(function, child)?;
        }
        Ok(())
    }

    fn write_children(&mut self, function: &Function) -> Result<(), Error> {
        if self.layout.child_functions {
            self.write_functions(&function.children, true)
        } else if !function.children.is_empty() {
            Err(self.unrepresentable(format!("child functions of `{}`", function.name)))
        } else {
            Ok(())
        }
    }

    fn write_function(&mut self, function: &Function, child: bool) -> Result<(), Error> {
        if function.kind == FunctionKind::Call {
            return Err(self.unrepresentable(format!(
                "call `{}` outside of a parameter",
                function.name
            )));
        }

        self.write_i32(function.kind.raw());
        match (child, function.branch) {
            (true, Some(branch)) => self.write_i32(branch),
            (true, None) => {
                return Err(self.unrepresentable(format!(
                    "child function `{}` without a branch",
                    function.name
                )))
            }
            (false, Some(_)) => {
                return Err(self.unrepresentable(format!(
                    "branch on top level function `{}`",
                    function.name
                )))
            }
            (false, None) => {}
        }

        self.write_string(&function.name)?;
        self.write_bool(function.enabled);
        for param in &function.parameters {
            self.write_parameter(param)?;
        }

        self.write_children(function)
    }

    fn write_call(&mut self, function: &Function) -> Result<(), Error> {
        if function.branch.is_some() {
            return Err(self.unrepresentable(format!("branch on call `{}`", function.name)));
        }

        if !function.enabled && !function.parameters.is_empty() {
            return Err(self.unrepresentable(format!(
                "parameters of call `{}` without its parameter flag",
                function.name
            )));
        }

        self.write_i32(function.kind.raw());
        self.write_string(&function.name)?;
        self.write_bool(function.enabled);
        for param in &function.parameters {
            self.write_parameter(param)?;
        }

        self.write_children(function)
    }

    fn write_parameter(&mut self, param: &Parameter) -> Result<(), Error> {
        self.write_i32(param.tag());
        self.write_string(param.value())?;
        match param {
            Parameter::Call { function } => {
                self.write_bool(true);
                self.write_call(function)?;
                self.write_bool(false);
            }
            Parameter::Variable { index, .. } => {
                self.write_bool(false);
                match index {
                    Some(index) => {
                        self.write_bool(true);
                        self.write_parameter(index)?;
                    }
                    None => self.write_bool(false),
                }
            }
            Parameter::Preset { .. } | Parameter::String { .. } => {
                self.write_bool(false);
                self.write_bool(false);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Signature, Trigger, TriggerData, Variable};
    use rstest::*;

    fn tft_doc() -> Document {
        let mut doc = Document::new(Version::TFT);
        doc.push_category(Category::new(1, "Init"));
        doc.insert_variable(Variable::new("count", "integer"));
        doc.push_trigger(
            Trigger::new("Setup", 1).with_function(
                Function::action("IfThenElseMultiple")
                    .with_child(Function::BRANCH_THEN, Function::action("DoNothing")),
            ),
        );
        doc
    }

    #[test]
    fn test_encode_is_deterministic() {
        let doc = tft_doc();
        let first = Encoder::new().encode(&doc).unwrap();
        let second = Encoder::new().encode(&doc).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.to_vec().unwrap(), first);
    }

    #[test]
    fn test_encode_variable_layout() {
        let mut doc = Document::new(Version::TFT);
        doc.insert_variable(Variable::new("names", "string").array(2).initial("x"));
        let data = doc.to_vec().unwrap();

        let mut expected = b"WTG!".to_vec();
        for x in [7, 0, 2, 1] {
            expected.extend_from_slice(&i32::to_le_bytes(x));
        }
        expected.extend_from_slice(b"names\0string\0");
        for x in [1, 1, 2, 1] {
            expected.extend_from_slice(&i32::to_le_bytes(x));
        }
        expected.extend_from_slice(b"x\0");
        expected.extend_from_slice(&i32::to_le_bytes(0));
        assert_eq!(data, expected);
    }

    #[rstest]
    #[case::comment_category(|doc: &mut Document| doc.categories_mut()[0].is_comment = true)]
    #[case::comment_trigger(|doc: &mut Document| doc.triggers_mut()[0].is_comment = true)]
    #[case::array_size(|doc: &mut Document| {
        doc.insert_variable(Variable::new("count", "integer").array(4));
    })]
    #[case::child_functions(|_: &mut Document| {})]
    fn test_downgrade_to_roc_fails(#[case] edit: fn(&mut Document)) {
        let mut doc = tft_doc();
        edit(&mut doc);
        let err = Encoder::with_version(Version::ROC).encode(&doc).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnrepresentableValue { version: 4, .. }
        ));
    }

    #[test]
    fn test_downgrade_without_new_features() {
        let mut doc = tft_doc();
        doc.triggers_mut()[0].functions = vec![Function::action("DoNothing")];
        let data = Encoder::with_version(Version::ROC).encode(&doc).unwrap();
        assert_eq!(&data[4..8], &[4, 0, 0, 0]);
    }

    #[rstest]
    #[case::child_without_branch(Function {
        children: vec![Function::action("DoNothing")],
        ..Function::action("IfThenElseMultiple")
    })]
    #[case::branch_on_root(Function::action("DoNothing").with_child(0, Function::action("DoNothing")).children.remove(0))]
    #[case::root_call(Function::call("GetPlayersAll"))]
    #[case::nul_in_name(Function::action("Do\0Nothing"))]
    #[case::disabled_call_with_params(Function::action("DisplayTextToForce").with_param(
        Parameter::call(Function::call("GetPlayersAll").enabled(false).with_param(Parameter::string("x")))
    ))]
    fn test_unrepresentable_functions(#[case] function: Function) {
        let mut doc = tft_doc();
        doc.triggers_mut()[0].functions = vec![function];
        let err = doc.to_vec().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnrepresentableValue { version: 7, .. }
        ));
    }

    #[test]
    fn test_encode_resolved_rejects_arity_mismatch() {
        let mut data = TriggerData::new();
        data.insert(FunctionKind::Action, "IfThenElseMultiple", Signature::default());
        data.insert(FunctionKind::Action, "DoNothing", Signature::default());
        data.insert(
            FunctionKind::Action,
            "SetVariable",
            Signature::new(["AnyGlobal", "VarAsString_Real"]),
        );
        data.insert(
            FunctionKind::Call,
            "OperatorInt",
            Signature::new(["integer", "ArithmeticOperator", "integer"]),
        );

        let doc = tft_doc();
        assert_eq!(
            Encoder::new().encode_resolved(&doc, &data).unwrap(),
            doc.to_vec().unwrap()
        );

        // Disabled root actions still carry their parameters
        let mut muted = tft_doc();
        muted.triggers_mut()[0].functions[0] = Function::action("IfThenElseMultiple")
            .with_child(Function::BRANCH_THEN, Function::action("SetVariable").enabled(false));
        assert!(muted.to_vec().is_ok());
        let err = Encoder::new().encode_resolved(&muted, &data).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnrepresentableValue { version: 7, what } if what.contains("SetVariable")
        ));

        // Disabled calls do not
        let mut quiet = tft_doc();
        quiet.triggers_mut()[0].functions[0] = Function::action("SetVariable")
            .with_param(Parameter::variable("count"))
            .with_param(Parameter::call(Function::call("OperatorInt").enabled(false)));
        assert!(Encoder::new().encode_resolved(&quiet, &data).is_ok());
    }
}
