/*!

A lossless reader and writer for Warcraft III map trigger files (`war3map.wtg`).

The trigger file holds a map's trigger editor contents: categories, global
variables, and triggers built out of event / condition / action function
trees. This crate decodes the file into a [Document], lets callers inspect or
edit it, and encodes it back into the byte layout the World Editor expects.

## Features

- ✔ Lossless: an unmodified document is written back byte for byte, aside
  from the enumerated [Variance] regions
- ✔ Versioned: both the Reign of Chaos (4) and Frozen Throne (7) layouts are
  read and written, and downgrades that would lose data are reported
- ✔ Safe: counts are checked against the remaining input before allocating
  and nesting is bounded, so corrupt files fail instead of exhausting memory
- ✔ Stateless: a [Decoder] or [Encoder] can be shared freely between threads

## Quick Start

The file does not record how many parameters each function takes. That
knowledge lives in the game's `TriggerData.txt`, which is supplied through a
[FunctionResolver] such as [TriggerData].

```rust
use wtg::{
    Category, Document, Function, FunctionKind, Parameter, Signature, Trigger, TriggerData,
    Variable, Version,
};

let mut data = TriggerData::new();
data.insert(FunctionKind::Event, "MapInitializationEvent", Signature::default());
data.insert(
    FunctionKind::Action,
    "SetVariable",
    Signature::new(["AnyGlobal", "VarAsString_Real"]),
);

let mut doc = Document::new(Version::TFT);
doc.push_category(Category::new(0, "Initialization"));
doc.insert_variable(Variable::new("gold", "integer").initial("500"));
doc.push_trigger(
    Trigger::new("Starting Gold", 0)
        .with_function(Function::event("MapInitializationEvent"))
        .with_function(
            Function::action("SetVariable")
                .with_param(Parameter::variable("gold"))
                .with_param(Parameter::string("750")),
        ),
);

let bytes = doc.to_vec()?;
let decoded = Document::from_slice(&bytes, &data)?;
assert_eq!(decoded, doc);
assert_eq!(decoded.to_vec()?, bytes);
# Ok::<(), wtg::Error>(())
```

## Configuration

Use [Decoder::builder] to adjust the nesting bound or to skip the reference
check that runs after decoding, and [Encoder::with_version] to write a
document in a different layout than it was read in.

```rust
use wtg::{Decoder, Document, Encoder, TriggerData, Version};

let doc = Document::new(Version::TFT);
let bytes = Encoder::with_version(Version::ROC).encode(&doc)?;

let decoder = Decoder::builder().max_depth(16).verify_references(false).build();
let decoded = decoder.decode(&bytes, &TriggerData::new())?;
assert_eq!(decoded.version(), Version::ROC);
# Ok::<(), wtg::Error>(())
```

## Repair

Files produced by merge tools often carry out-of-range category ids or
triggers whose category is gone. Decode them with the reference check off and
call [Document::repair], which renumbers categories and rehomes orphaned
triggers so the result passes [Document::verify].

## Caveats

Caller is responsible for:

- Extracting `war3map.wtg` from the map archive
- Providing the function table matching the game version the map targets
- Files saved by 1.31+ editors use a different item-tree layout and are
  rejected as unsupported

*/

mod depth;
mod diff;
mod document;
mod errors;
mod function;
mod reader;
mod repair;
mod resolver;
mod summary;
pub(crate) mod util;
mod validate;
mod version;
mod writer;

pub use self::depth::DEFAULT_MAX_DEPTH;
pub use self::diff::{Changes, DocumentDiff};
pub use self::document::{Category, Document, Trigger, Variable, VariableType};
pub use self::errors::*;
pub use self::function::{Function, FunctionKind, Parameter};
pub use self::reader::{read_header, Decoder, DecoderBuilder, MAGIC};
pub use self::repair::{Repairs, RECOVERED_CATEGORY};
pub use self::resolver::{FunctionResolver, Signature, TriggerData};
pub use self::summary::{Listing, Summary};
pub use self::validate::{Diagnostic, Severity, GENERATED_GLOBAL_PREFIX};
pub use self::version::{Layout, Variance, Version};
pub use self::writer::Encoder;
