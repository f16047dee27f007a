//! Stream transfers.
//!
//! A [`Transfer`] is one beat's worth of values for the eight AXI-Stream
//! fields. Every field is independently optional: a transfer only presents the
//! fields it carries, and only onto the fields the bus actually has.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::Bits;

/// The eight recognized AXI-Stream fields.
///
/// Serialized with the conventional signal suffixes (`tdata`, `tkeep`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Payload data.
    #[serde(rename = "tdata")]
    Data,
    /// Byte qualifier mask.
    #[serde(rename = "tkeep")]
    Keep,
    /// Handshake: source has a beat.
    #[serde(rename = "tvalid")]
    Valid,
    /// Handshake: sink accepts a beat.
    #[serde(rename = "tready")]
    Ready,
    /// Marks the final beat of a packet.
    #[serde(rename = "tlast")]
    Last,
    /// Stream identifier.
    #[serde(rename = "tid")]
    Id,
    /// Routing destination.
    #[serde(rename = "tdest")]
    Dest,
    /// User sideband.
    #[serde(rename = "tuser")]
    User,
}

impl Field {
    /// Number of recognized fields.
    pub const COUNT: usize = 8;

    /// All fields, in signal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Data,
        Self::Keep,
        Self::Valid,
        Self::Ready,
        Self::Last,
        Self::Id,
        Self::Dest,
        Self::User,
    ];

    /// Returns the signal suffix for this field (e.g. `"tvalid"`).
    pub const fn signal_name(self) -> &'static str {
        match self {
            Self::Data => "tdata",
            Self::Keep => "tkeep",
            Self::Valid => "tvalid",
            Self::Ready => "tready",
            Self::Last => "tlast",
            Self::Id => "tid",
            Self::Dest => "tdest",
            Self::User => "tuser",
        }
    }

    /// Returns the position of this field in [`Field::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signal_name())
    }
}

/// Label used in logs for transfers built without a name.
const UNNAMED: &str = "<unnamed>";

/// One beat of field values, built once and consumed once.
///
/// Transfers are assembled with the consuming `with_*` builders and are never
/// mutated afterwards.
///
/// # Examples
///
/// ```
/// use axis_transfer::{Bits, Field, Transfer};
///
/// let end = Transfer::new("end")
///     .with_data(Bits::zero(64))
///     .with_valid(true)
///     .with_last(true);
///
/// assert_eq!(end.label(), "end");
/// assert!(end.is_last());
/// assert_eq!(end.get(Field::Data).map(Bits::width), Some(64));
/// assert!(end.get(Field::Id).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, rename = "tdata", skip_serializing_if = "Option::is_none")]
    data: Option<Bits>,
    #[serde(default, rename = "tkeep", skip_serializing_if = "Option::is_none")]
    keep: Option<Bits>,
    #[serde(default, rename = "tvalid", skip_serializing_if = "Option::is_none")]
    valid: Option<Bits>,
    #[serde(default, rename = "tready", skip_serializing_if = "Option::is_none")]
    ready: Option<Bits>,
    #[serde(default, rename = "tlast", skip_serializing_if = "Option::is_none")]
    last: Option<Bits>,
    #[serde(default, rename = "tid", skip_serializing_if = "Option::is_none")]
    id: Option<Bits>,
    #[serde(default, rename = "tdest", skip_serializing_if = "Option::is_none")]
    dest: Option<Bits>,
    #[serde(default, rename = "tuser", skip_serializing_if = "Option::is_none")]
    user: Option<Bits>,
}

impl Transfer {
    /// Creates a named transfer with no fields set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets `field` to `value`.
    #[must_use]
    pub fn with(mut self, field: Field, value: Bits) -> Self {
        *self.slot_mut(field) = Some(value);
        self
    }

    /// Sets `tdata`.
    #[must_use]
    pub fn with_data(self, value: Bits) -> Self {
        self.with(Field::Data, value)
    }

    /// Sets `tkeep`.
    #[must_use]
    pub fn with_keep(self, value: Bits) -> Self {
        self.with(Field::Keep, value)
    }

    /// Sets `tvalid`.
    #[must_use]
    pub fn with_valid(self, valid: bool) -> Self {
        self.with(Field::Valid, Bits::from_bool(valid))
    }

    /// Sets `tready`.
    #[must_use]
    pub fn with_ready(self, ready: bool) -> Self {
        self.with(Field::Ready, Bits::from_bool(ready))
    }

    /// Sets `tlast`.
    #[must_use]
    pub fn with_last(self, last: bool) -> Self {
        self.with(Field::Last, Bits::from_bool(last))
    }

    /// Sets `tid`.
    #[must_use]
    pub fn with_id(self, value: Bits) -> Self {
        self.with(Field::Id, value)
    }

    /// Sets `tdest`.
    #[must_use]
    pub fn with_dest(self, value: Bits) -> Self {
        self.with(Field::Dest, value)
    }

    /// Sets `tuser`.
    #[must_use]
    pub fn with_user(self, value: Bits) -> Self {
        self.with(Field::User, value)
    }

    /// Returns the debug name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the debug name, or a placeholder for unnamed transfers.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }

    /// Returns the value carried for `field`, if set.
    pub const fn get(&self, field: Field) -> Option<&Bits> {
        match field {
            Field::Data => self.data.as_ref(),
            Field::Keep => self.keep.as_ref(),
            Field::Valid => self.valid.as_ref(),
            Field::Ready => self.ready.as_ref(),
            Field::Last => self.last.as_ref(),
            Field::Id => self.id.as_ref(),
            Field::Dest => self.dest.as_ref(),
            Field::User => self.user.as_ref(),
        }
    }

    /// Iterates over the fields this transfer carries, in signal order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &Bits)> {
        Field::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    /// Returns `true` if `tvalid` is carried and asserted.
    pub fn is_valid(&self) -> bool {
        self.valid.as_ref().is_some_and(Bits::as_bool)
    }

    /// Returns `true` if `tlast` is carried and asserted.
    pub fn is_last(&self) -> bool {
        self.last.as_ref().is_some_and(Bits::as_bool)
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<Bits> {
        match field {
            Field::Data => &mut self.data,
            Field::Keep => &mut self.keep,
            Field::Valid => &mut self.valid,
            Field::Ready => &mut self.ready,
            Field::Last => &mut self.last,
            Field::Id => &mut self.id,
            Field::Dest => &mut self.dest,
            Field::User => &mut self.user,
        }
    }
}

impl fmt::Display for Transfer {
    /// Formats as `label(field=value, ...)` listing only carried fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.label())?;
        for (i, (field, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}={value}")?;
        }
        f.write_str(")")
    }
}
