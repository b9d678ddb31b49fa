use std::fmt;

/// The format version tag stored after the `WTG!` magic
///
/// Any 32 bit value can be represented so that callers can ask for a version
/// that has no [Layout]. Only versions with a registered layout can be read
/// or written.
///
/// ```
/// use wtg::Version;
///
/// assert!(Version::TFT.layout().is_some());
/// assert!(Version::new(5).layout().is_none());
/// assert_eq!(Version::ROC.raw(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Version(i32);

impl Version {
    /// Reign of Chaos layout
    pub const ROC: Version = Version(4);

    /// The Frozen Throne layout
    pub const TFT: Version = Version(7);

    /// Creates a version from its on-disk value
    pub const fn new(raw: i32) -> Self {
        Version(raw)
    }

    /// The on-disk value
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// The field layout registered for this version
    pub fn layout(self) -> Option<&'static Layout> {
        Layout::lookup(self)
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::TFT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A byte range where more than one encoding is valid and an unmodified round
/// trip is allowed to differ from the original file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variance {
    /// Boolean fields are stored as 32 bit integers. Any non-zero value is
    /// read as true and written back as 1.
    BooleanFlag,

    /// The initial value string of a variable that is not marked as
    /// initialized is discarded and written back empty.
    UninitializedValue,
}

/// Describes which optional fields a format version stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Version this layout belongs to
    pub version: Version,

    /// Categories carry an `is_comment` flag
    pub category_comments: bool,

    /// Variables carry an explicit array size
    pub array_sizes: bool,

    /// Triggers carry an `is_comment` flag
    pub trigger_comments: bool,

    /// Functions carry a child block and child functions carry a branch tag
    pub child_functions: bool,

    /// Regions that may differ on an unmodified round trip
    pub tolerated: &'static [Variance],
}

const TOLERATED: &[Variance] = &[Variance::BooleanFlag, Variance::UninitializedValue];

static LAYOUTS: [Layout; 2] = [
    Layout {
        version: Version::ROC,
        category_comments: false,
        array_sizes: false,
        trigger_comments: false,
        child_functions: false,
        tolerated: TOLERATED,
    },
    Layout {
        version: Version::TFT,
        category_comments: true,
        array_sizes: true,
        trigger_comments: true,
        child_functions: true,
        tolerated: TOLERATED,
    },
];

impl Layout {
    /// Array size assumed for every variable in layouts without array sizes
    pub const IMPLICIT_ARRAY_SIZE: i32 = 1;

    /// Find the layout for a version
    pub fn lookup(version: Version) -> Option<&'static Layout> {
        LAYOUTS.iter().find(|x| x.version == version)
    }

    /// All registered layouts, oldest first
    pub fn all() -> &'static [Layout] {
        &LAYOUTS
    }

    /// Smallest possible encoding of a category
    pub(crate) fn min_category_len(&self) -> usize {
        // id, empty name
        let base = 4 + 1;
        base + if self.category_comments { 4 } else { 0 }
    }

    /// Smallest possible encoding of a variable
    pub(crate) fn min_variable_len(&self) -> usize {
        // name, type, global, is_array, initialized, initial value
        let base = 1 + 1 + 4 + 4 + 4 + 1;
        base + if self.array_sizes { 4 } else { 0 }
    }

    /// Smallest possible encoding of a trigger
    pub(crate) fn min_trigger_len(&self) -> usize {
        // name, description, 4 flags, category, function count
        let base = 1 + 1 + 4 * 4 + 4 + 4;
        base + if self.trigger_comments { 4 } else { 0 }
    }

    /// Smallest possible encoding of a function without parameters
    pub(crate) fn min_function_len(&self, child: bool) -> usize {
        // kind, name, enabled
        let mut len = 4 + 1 + 4;
        if self.child_functions {
            len += 4;
            if child {
                len += 4;
            }
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(Version::ROC, true)]
    #[case(Version::TFT, true)]
    #[case(Version::new(0), false)]
    #[case(Version::new(5), false)]
    #[case(Version::new(0x8000_0007_u32 as i32), false)]
    fn test_layout_lookup(#[case] version: Version, #[case] registered: bool) {
        assert_eq!(Layout::lookup(version).is_some(), registered);
        if let Some(layout) = version.layout() {
            assert_eq!(layout.version, version);
        }
    }

    #[test]
    fn test_tft_is_superset_of_roc() {
        let roc = Version::ROC.layout().unwrap();
        let tft = Version::TFT.layout().unwrap();
        assert!(roc.min_variable_len() < tft.min_variable_len());
        assert!(roc.min_trigger_len() < tft.min_trigger_len());
        assert_eq!(roc.min_function_len(true), roc.min_function_len(false));
        assert_eq!(tft.min_function_len(true), tft.min_function_len(false) + 4);
        assert_eq!(roc.tolerated, tft.tolerated);
    }
}
