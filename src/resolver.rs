use crate::{
    errors::{TriggerDataError, TriggerDataErrorKind},
    FunctionKind,
};
use std::collections::HashMap;

/// The argument list of a trigger function
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    params: Vec<String>,
    return_type: Option<String>,
}

impl Signature {
    /// Creates a signature from the type names of its arguments
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Signature {
            params: params.into_iter().map(|x| x.into()).collect(),
            return_type: None,
        }
    }

    /// Sets the type a call evaluates to
    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Expected type of each argument in order
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }
}

/// Resolves the signature of a trigger function
///
/// The trigger file does not record how many parameters a function takes, so
/// the reader needs the same function table the editor uses. One can create
/// their own `FunctionResolver` or rely on [TriggerData].
///
/// ```
/// use wtg::{FunctionKind, FunctionResolver, Signature, TriggerData};
///
/// let mut data = TriggerData::new();
/// data.insert(FunctionKind::Action, "DisplayTextToForce", Signature::new(["force", "string"]));
///
/// let sig = data.resolve(FunctionKind::Action, "DisplayTextToForce").unwrap();
/// assert_eq!(sig.arity(), 2);
/// assert!(data.resolve(FunctionKind::Action, "Unknown").is_none());
/// ```
pub trait FunctionResolver {
    /// Return the signature of the function if known
    fn resolve(&self, kind: FunctionKind, name: &str) -> Option<&Signature>;
}

impl<T: FunctionResolver + ?Sized> FunctionResolver for &'_ T {
    fn resolve(&self, kind: FunctionKind, name: &str) -> Option<&Signature> {
        (**self).resolve(kind, name)
    }
}

impl<T: FunctionResolver + ?Sized> FunctionResolver for Box<T> {
    fn resolve(&self, kind: FunctionKind, name: &str) -> Option<&Signature> {
        (**self).resolve(kind, name)
    }
}

const KINDS: [FunctionKind; 4] = [
    FunctionKind::Event,
    FunctionKind::Condition,
    FunctionKind::Action,
    FunctionKind::Call,
];

/// Function tables keyed by kind, as found in the game's `TriggerData.txt`
///
/// A lookup consults the table for the requested kind first and then the
/// remaining tables, as the editor allows a condition to be nested as a
/// boolean call and so on.
///
/// ```
/// use wtg::{FunctionKind, FunctionResolver, TriggerData};
///
/// let data = TriggerData::from_text(br#"
/// [TriggerConditions]
/// OperatorCompareInteger=0,integer,ComparisonOperator,integer
///
/// [TriggerCalls]
/// // version, usable in events, return type, arguments
/// GetPlayersAll=0,0,force
/// "#).unwrap();
///
/// let sig = data.resolve(FunctionKind::Call, "OperatorCompareInteger").unwrap();
/// assert_eq!(sig.params(), ["integer", "ComparisonOperator", "integer"]);
///
/// let sig = data.resolve(FunctionKind::Call, "GetPlayersAll").unwrap();
/// assert_eq!(sig.arity(), 0);
/// assert_eq!(sig.return_type(), Some("force"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TriggerData {
    tables: [HashMap<String, Signature>; 4],
}

impl TriggerData {
    pub fn new() -> Self {
        TriggerData::default()
    }

    fn table_index(kind: FunctionKind) -> usize {
        match kind {
            FunctionKind::Event => 0,
            FunctionKind::Condition => 1,
            FunctionKind::Action => 2,
            FunctionKind::Call => 3,
        }
    }

    /// Registers a function, replacing any previous signature of that kind
    pub fn insert(
        &mut self,
        kind: FunctionKind,
        name: impl Into<String>,
        signature: Signature,
    ) -> Option<Signature> {
        self.tables[Self::table_index(kind)].insert(name.into(), signature)
    }

    /// Number of registered functions of the given kind
    pub fn len(&self, kind: FunctionKind) -> usize {
        self.tables[Self::table_index(kind)].len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|x| x.is_empty())
    }

    /// Parses the function sections of a `TriggerData.txt` file
    ///
    /// Events, conditions, and actions are written as
    /// `Name=version,arg1,arg2,...` and calls as
    /// `Name=version,events_flag,return_type,arg1,...`. An argument list of
    /// `nothing` declares no arguments. Comment lines, `_` prefixed metadata
    /// keys, and all other sections are skipped.
    pub fn from_text(data: &[u8]) -> Result<Self, TriggerDataError> {
        let raw = String::from_utf8_lossy(data);
        let text = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        let mut result = TriggerData::new();
        let mut section = None;
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|x| x.strip_suffix(']')) {
                section = match header.trim() {
                    "TriggerEvents" => Some(FunctionKind::Event),
                    "TriggerConditions" => Some(FunctionKind::Condition),
                    "TriggerActions" => Some(FunctionKind::Action),
                    "TriggerCalls" => Some(FunctionKind::Call),
                    _ => None,
                };
                continue;
            }

            let Some(kind) = section else {
                continue;
            };

            let (name, values) = line.split_once('=').ok_or_else(|| {
                TriggerDataError::new(line_no, TriggerDataErrorKind::MissingSeparator)
            })?;

            let name = name.trim();
            if name.starts_with('_') {
                continue;
            }

            if name.is_empty() {
                return Err(TriggerDataError::new(
                    line_no,
                    TriggerDataErrorKind::EmptyName(line.to_owned()),
                ));
            }

            let signature = parse_signature(kind, name, values)
                .map_err(|kind| TriggerDataError::new(line_no, kind))?;
            result.insert(kind, name, signature);
        }

        log::debug!(
            "loaded trigger data: {} events, {} conditions, {} actions, {} calls",
            result.len(FunctionKind::Event),
            result.len(FunctionKind::Condition),
            result.len(FunctionKind::Action),
            result.len(FunctionKind::Call),
        );

        Ok(result)
    }
}

fn parse_numeric_field(
    name: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), TriggerDataErrorKind> {
    let value = value.ok_or_else(|| TriggerDataErrorKind::MissingField {
        name: name.to_owned(),
        field,
    })?;

    value
        .parse::<i32>()
        .map(|_| ())
        .map_err(|_| TriggerDataErrorKind::InvalidField {
            name: name.to_owned(),
            field,
            value: value.to_owned(),
        })
}

fn parse_signature(
    kind: FunctionKind,
    name: &str,
    values: &str,
) -> Result<Signature, TriggerDataErrorKind> {
    let mut fields = values.split(',').map(|x| x.trim());
    parse_numeric_field(name, "version", fields.next())?;

    let return_type = if kind == FunctionKind::Call {
        parse_numeric_field(name, "events flag", fields.next())?;
        let ret = fields.next().filter(|x| !x.is_empty()).ok_or_else(|| {
            TriggerDataErrorKind::MissingField {
                name: name.to_owned(),
                field: "return type",
            }
        })?;
        Some(ret.to_owned())
    } else {
        None
    };

    let params = fields.filter(|x| !x.is_empty() && *x != "nothing");
    let mut signature = Signature::new(params);
    signature.return_type = return_type;
    Ok(signature)
}

impl FunctionResolver for TriggerData {
    fn resolve(&self, kind: FunctionKind, name: &str) -> Option<&Signature> {
        self.tables[Self::table_index(kind)].get(name).or_else(|| {
            KINDS
                .iter()
                .filter(|x| **x != kind)
                .find_map(|x| self.tables[Self::table_index(*x)].get(name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    const SAMPLE: &[u8] = b"\xef\xbb\xbf// TriggerData excerpt\r
[TriggerTypes]\r
integer=0,1,1,WESTRING_TRIGTYPE_integer\r
\r
[TriggerEvents]\r
_MapInitializationEvent_Category=TC_MAP\r
MapInitializationEvent=0,nothing\r
TriggerRegisterTimerEventPeriodic=0,real\r
\r
[TriggerActions]\r
IfThenElseMultiple=1\r
DisplayTextToForce=0,force,StringExt\r
\r
[TriggerCalls]\r
OperatorInt=0,1,integer,integer,ArithmeticOperator,integer\r
\r
[DefaultTriggers]\r
NumCategories=1\r
";

    #[test]
    fn test_parse_sample() {
        let data = TriggerData::from_text(SAMPLE).unwrap();
        assert_eq!(data.len(FunctionKind::Event), 2);
        assert_eq!(data.len(FunctionKind::Condition), 0);
        assert_eq!(data.len(FunctionKind::Action), 2);
        assert_eq!(data.len(FunctionKind::Call), 1);

        let sig = data
            .resolve(FunctionKind::Event, "MapInitializationEvent")
            .unwrap();
        assert_eq!(sig.arity(), 0);

        let sig = data
            .resolve(FunctionKind::Action, "IfThenElseMultiple")
            .unwrap();
        assert_eq!(sig.arity(), 0);

        let sig = data.resolve(FunctionKind::Call, "OperatorInt").unwrap();
        assert_eq!(sig.params(), ["integer", "ArithmeticOperator", "integer"]);
        assert_eq!(sig.return_type(), Some("integer"));
        assert!(data.resolve(FunctionKind::Call, "NumCategories").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_other_kinds() {
        let data = TriggerData::from_text(SAMPLE).unwrap();
        let sig = data
            .resolve(FunctionKind::Call, "DisplayTextToForce")
            .unwrap();
        assert_eq!(sig.arity(), 2);
    }

    #[rstest]
    #[case(b"[TriggerActions]\nDoNothing\n", 2, TriggerDataErrorKind::MissingSeparator)]
    #[case(
        b"[TriggerActions]\n\nDoNothing=x\n",
        3,
        TriggerDataErrorKind::InvalidField { name: "DoNothing".into(), field: "version", value: "x".into() }
    )]
    #[case(
        b"[TriggerCalls]\nGetPlayersAll=0,0\n",
        2,
        TriggerDataErrorKind::MissingField { name: "GetPlayersAll".into(), field: "return type" }
    )]
    #[case(
        b"[TriggerEvents]\n=0,nothing\n",
        2,
        TriggerDataErrorKind::EmptyName("=0,nothing".into())
    )]
    fn test_parse_errors(
        #[case] input: &[u8],
        #[case] line: usize,
        #[case] kind: TriggerDataErrorKind,
    ) {
        let err = TriggerData::from_text(input).unwrap_err();
        assert_eq!(err.line(), line);
        assert_eq!(err.kind(), &kind);
    }

    #[test]
    fn test_lines_outside_function_sections_are_ignored() {
        let data = TriggerData::from_text(b"garbage\n[TriggerParams]\nnot a pair\n").unwrap();
        assert!(data.is_empty());
    }
}
