use crate::{
    depth::{Depth, DEFAULT_MAX_DEPTH},
    errors::{Error, ErrorKind, Malformed},
    util::{get_split, le_i32, split_cstr},
    Category, Document, Function, FunctionKind, FunctionResolver, Layout, Parameter, Trigger,
    Variable, VariableType, Version,
};
use std::io::Read;

/// The four bytes every trigger file starts with
pub const MAGIC: [u8; 4] = *b"WTG!";

/// Reads the magic and version that prefix every trigger file
///
/// ```
/// use wtg::{read_header, Version};
/// let data = [b'W', b'T', b'G', b'!', 0x07, 0x00, 0x00, 0x00];
/// assert_eq!(read_header(&data[..]).unwrap(), Version::TFT);
/// assert!(read_header(&b"WTF!\x07\x00\x00\x00"[..]).is_err());
/// ```
pub fn read_header(data: &[u8]) -> Result<Version, Error> {
    let mut reader = ByteReader::new(data);
    reader.read_header()
}

/// Customizes how a [Decoder] treats its input
///
/// ```
/// use wtg::Decoder;
/// let decoder = Decoder::builder()
///     .max_depth(16)
///     .verify_references(false)
///     .build();
/// assert_eq!(decoder.max_depth(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct DecoderBuilder {
    max_depth: usize,
    verify_references: bool,
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        DecoderBuilder::new()
    }
}

impl DecoderBuilder {
    pub fn new() -> Self {
        DecoderBuilder {
            max_depth: DEFAULT_MAX_DEPTH,
            verify_references: true,
        }
    }

    /// Bound on how deeply functions and parameters may nest. Each nested
    /// call consumes two levels: one for the parameter and one for the
    /// function.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether category and variable references are checked after decoding
    pub fn verify_references(mut self, verify: bool) -> Self {
        self.verify_references = verify;
        self
    }

    pub fn build(self) -> Decoder {
        Decoder {
            max_depth: self.max_depth,
            verify_references: self.verify_references,
        }
    }
}

/// Decodes trigger files into a [Document]
///
/// The decoder holds no state between calls so one decoder can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Decoder {
    max_depth: usize,
    verify_references: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl Decoder {
    /// Convenience method for constructing the default decoder
    pub fn new() -> Self {
        DecoderBuilder::new().build()
    }

    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::new()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decode a complete trigger file
    pub fn decode<R>(&self, data: &[u8], resolver: &R) -> Result<Document, Error>
    where
        R: FunctionResolver + ?Sized,
    {
        let mut reader = ByteReader::new(data);
        let version = reader.read_header()?;
        let layout = Layout::lookup(version).ok_or_else(|| {
            Error::new(ErrorKind::UnsupportedVersion {
                version: version.raw(),
            })
        })?;

        log::debug!("decoding trigger file version {}", version);
        let mut state = DecodeState {
            reader,
            layout,
            resolver,
            depth: Depth::new(self.max_depth),
        };

        let doc = state.read_document()?;
        let trailing = state.reader.remaining();
        if trailing != 0 {
            return Err(Error::malformed(
                Some(state.reader.offset()),
                Malformed::TrailingBytes(trailing),
            ));
        }

        if self.verify_references {
            doc.verify()?;
        }

        Ok(doc)
    }

    /// Read the reader to completion and decode it
    pub fn decode_reader<Rd, R>(&self, mut reader: Rd, resolver: &R) -> Result<Document, Error>
    where
        Rd: Read,
        R: FunctionResolver + ?Sized,
    {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.decode(&data, resolver)
    }
}

impl Document {
    /// Decode a trigger file with the default [Decoder]
    pub fn from_slice<R>(data: &[u8], resolver: &R) -> Result<Document, Error>
    where
        R: FunctionResolver + ?Sized,
    {
        Decoder::new().decode(data, resolver)
    }
}

/// Cursor over the input that reports the offset of every failure
#[derive(Debug)]
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        ByteReader { data, offset: 0 }
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    #[inline]
    fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    fn truncated(&self, needed: usize) -> Error {
        Error::new(ErrorKind::TruncatedInput {
            offset: self.offset,
            needed,
            remaining: self.remaining(),
        })
    }

    fn read_header(&mut self) -> Result<Version, Error> {
        match get_split::<4>(self.rest()) {
            Some((magic, _)) if magic == MAGIC => self.offset += 4,
            Some((magic, _)) => {
                return Err(Error::new(ErrorKind::InvalidHeader {
                    found: magic.to_vec(),
                }))
            }
            None => {
                return Err(Error::new(ErrorKind::InvalidHeader {
                    found: self.rest().to_vec(),
                }))
            }
        }

        self.read_i32().map(Version::new)
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32, Error> {
        let (data, _) = get_split::<4>(self.rest()).ok_or_else(|| self.truncated(4))?;
        self.offset += 4;
        Ok(le_i32(data))
    }

    #[inline]
    fn read_bool(&mut self) -> Result<bool, Error> {
        self.read_i32().map(|x| x != 0)
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let rest = self.rest();
        let (data, _) = split_cstr(rest).ok_or_else(|| self.truncated(rest.len() + 1))?;
        let s = std::str::from_utf8(data)
            .map_err(|_| Error::malformed(Some(self.offset), Malformed::InvalidString))?;
        self.offset += data.len() + 1;
        Ok(s.to_owned())
    }

    /// Reads a record count, rejecting counts that are negative or that
    /// could not fit in the remaining input
    fn read_count(&mut self, min_record_len: usize) -> Result<usize, Error> {
        let at = self.offset;
        let raw = self.read_i32()?;
        let count = usize::try_from(raw)
            .map_err(|_| Error::malformed(Some(at), Malformed::NegativeCount(raw)))?;

        let needed = count.saturating_mul(min_record_len);
        if needed > self.remaining() {
            return Err(self.truncated(needed));
        }

        Ok(count)
    }
}

/// Where a function appears, which decides the fields it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Site {
    /// Top level of a trigger
    Root,

    /// Inside another function's child block
    Child,

    /// Inside a parameter
    Call,
}

struct DecodeState<'a, 'r, R: ?Sized> {
    reader: ByteReader<'a>,
    layout: &'static Layout,
    resolver: &'r R,
    depth: Depth,
}

impl<R> DecodeState<'_, '_, R>
where
    R: FunctionResolver + ?Sized,
{
    fn read_document(&mut self) -> Result<Document, Error> {
        let mut doc = Document::new(self.layout.version);

        let count = self.reader.read_count(self.layout.min_category_len())?;
        log::debug!("reading {} categories", count);
        let categories = doc.categories_mut();
        categories.reserve(count);
        for _ in 0..count {
            let category = self.read_category()?;
            categories.push(category);
        }

        doc.set_game_version(self.reader.read_i32()?);

        let count = self.reader.read_count(self.layout.min_variable_len())?;
        log::debug!("reading {} variables", count);
        for _ in 0..count {
            let at = self.reader.offset();
            let variable = self.read_variable()?;
            if doc.variable(&variable.name).is_some() {
                return Err(Error::malformed(
                    Some(at),
                    Malformed::DuplicateVariable(variable.name),
                ));
            }
            doc.insert_variable(variable);
        }

        let count = self.reader.read_count(self.layout.min_trigger_len())?;
        log::debug!("reading {} triggers", count);
        let triggers = doc.triggers_mut();
        triggers.reserve(count);
        for _ in 0..count {
            let trigger = self.read_trigger()?;
            triggers.push(trigger);
        }

        Ok(doc)
    }

    fn read_category(&mut self) -> Result<Category, Error> {
        let id = self.reader.read_i32()?;
        let name = self.reader.read_string()?;
        let is_comment = if self.layout.category_comments {
            self.reader.read_bool()?
        } else {
            false
        };

        log::trace!("category {}: {}", id, name);
        Ok(Category {
            id,
            name,
            is_comment,
        })
    }

    fn read_variable(&mut self) -> Result<Variable, Error> {
        let name = self.reader.read_string()?;
        let ty = VariableType::from(self.reader.read_string()?);
        let global = self.reader.read_bool()?;
        let is_array = self.reader.read_bool()?;
        let array_size = if self.layout.array_sizes {
            self.reader.read_i32()?
        } else {
            Layout::IMPLICIT_ARRAY_SIZE
        };
        let initialized = self.reader.read_bool()?;
        let value = self.reader.read_string()?;

        log::trace!("variable {} ({})", name, ty);
        Ok(Variable {
            name,
            ty,
            global,
            is_array,
            array_size,
            initial_value: initialized.then_some(value),
        })
    }

    fn read_trigger(&mut self) -> Result<Trigger, Error> {
        let name = self.reader.read_string()?;
        let description = self.reader.read_string()?;
        let is_comment = if self.layout.trigger_comments {
            self.reader.read_bool()?
        } else {
            false
        };
        let enabled = self.reader.read_bool()?;
        let custom_text = self.reader.read_bool()?;
        let initially_off = self.reader.read_bool()?;
        let run_on_map_init = self.reader.read_bool()?;
        let category = self.reader.read_i32()?;

        log::trace!("trigger {} in category {}", name, category);
        let functions = self.read_functions(Site::Root)?;
        Ok(Trigger {
            name,
            description,
            is_comment,
            enabled,
            custom_text,
            initially_on: !initially_off,
            run_on_map_init,
            category,
            functions,
        })
    }

    fn read_functions(&mut self, site: Site) -> Result<Vec<Function>, Error> {
        let count = self
            .reader
            .read_count(self.layout.min_function_len(site == Site::Child))?;
        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            result.push(self.read_function(site)?);
        }
        Ok(result)
    }

    fn enter(&mut self) -> Result<(), Error> {
        if self.depth.push() {
            Ok(())
        } else {
            Err(Error::malformed(
                Some(self.reader.offset()),
                Malformed::DepthExceeded(self.depth.max()),
            ))
        }
    }

    fn read_function(&mut self, site: Site) -> Result<Function, Error> {
        self.enter()?;

        let at = self.reader.offset();
        let raw_kind = self.reader.read_i32()?;
        let kind = FunctionKind::from_raw(raw_kind)
            .ok_or_else(|| Error::malformed(Some(at), Malformed::FunctionKind(raw_kind)))?;

        let branch = if site == Site::Child {
            Some(self.reader.read_i32()?)
        } else {
            None
        };

        let name_at = self.reader.offset();
        let name = self.reader.read_string()?;
        if kind == FunctionKind::Call && site != Site::Call {
            return Err(Error::malformed(Some(at), Malformed::MisplacedCall(name)));
        }

        let enabled = self.reader.read_bool()?;
        let arity = self
            .resolver
            .resolve(kind, &name)
            .map(|x| x.arity())
            .ok_or_else(|| Error::malformed(Some(name_at), Malformed::UnknownFunction(name.clone())))?;

        // A call's enabled flag announces whether its parameters follow
        let arity = if site == Site::Call && !enabled { 0 } else { arity };
        let mut parameters = Vec::with_capacity(arity.min(self.reader.remaining()));
        for _ in 0..arity {
            parameters.push(self.read_parameter()?);
        }

        let children = if self.layout.child_functions {
            self.read_functions(Site::Child)?
        } else {
            Vec::new()
        };

        self.depth.pop();
        Ok(Function {
            kind,
            branch,
            name,
            enabled,
            parameters,
            children,
        })
    }

    fn read_parameter(&mut self) -> Result<Parameter, Error> {
        self.enter()?;

        let at = self.reader.offset();
        let tag = self.reader.read_i32()?;
        if !(0..=3).contains(&tag) {
            return Err(Error::malformed(Some(at), Malformed::ParameterTag(tag)));
        }

        let value = self.reader.read_string()?;
        let call = if self.reader.read_bool()? {
            Some(self.read_function(Site::Call)?)
        } else {
            None
        };

        let index = if self.reader.read_bool()? {
            Some(Box::new(self.read_parameter()?))
        } else {
            None
        };

        let result = match (tag, call, index) {
            (0, None, None) => Parameter::Preset { value },
            (1, None, index) => Parameter::Variable { name: value, index },
            (2, Some(function), None) if function.name == value => Parameter::Call {
                function: Box::new(function),
            },
            (2, Some(function), None) => {
                return Err(Error::malformed(
                    Some(at),
                    Malformed::CallNameMismatch {
                        value,
                        call: function.name,
                    },
                ))
            }
            (2, None, _) => return Err(Error::malformed(Some(at), Malformed::MissingCall(value))),
            (3, None, None) => Parameter::String { value },
            (_, Some(_), _) if tag != 2 => {
                return Err(Error::malformed(Some(at), Malformed::UnexpectedCall(value)))
            }
            _ => {
                return Err(Error::malformed(
                    Some(at),
                    Malformed::UnexpectedArrayIndex(value),
                ))
            }
        };

        self.depth.pop();
        Ok(result)
    }
}
