//! Flag reflection.
//!
//! A flags struct is declared with [`flag_set!`](crate::flag_set), which
//! records each field's name and `#[flag(...)]` tags. [`build_flags`] turns
//! those into [`Flag`] descriptors; the runtime writes parsed values back
//! through [`FlagSet::field_mut`].
//!
//! Recognized tags, all given as string literals:
//!
//! | tag          | meaning                                   |
//! |--------------|-------------------------------------------|
//! | `long`       | long name, `--long`                       |
//! | `short`      | single-character shorthand, `-s`          |
//! | `usage`      | help text                                 |
//! | `required`   | boolean, flag must be given               |
//! | `persistent` | boolean, flag is inherited by subcommands |
//! | `hidden`     | boolean, flag is left out of help         |
//! | `default`    | default value, parsed as the field's type |

use std::fmt;
use std::fmt::Write as _;
use std::time::Duration;

use clap::{Arg, ArgAction};
use meroxa_config::parse_bool;

/// Value type of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `String`
    String,
    /// `bool`
    Bool,
    /// Signed or small unsigned integers.
    Int,
    /// `f32` / `f64`
    Float,
    /// [`Duration`], written like `1h30m`, `10s` or `250ms`.
    Duration,
    /// `Vec<String>`
    StringList,
    /// `Vec<bool>`
    BoolList,
    /// `Vec<i32>` / `Vec<i64>`
    IntList,
    /// `Vec<f64>`
    FloatList,
}

impl FlagKind {
    /// Whether the flag accumulates repeated or comma-separated values.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Self::StringList | Self::BoolList | Self::IntList | Self::FloatList
        )
    }

    /// Kind of a single value given on the command line.
    fn item(self) -> Self {
        match self {
            Self::StringList => Self::String,
            Self::BoolList => Self::Bool,
            Self::IntList => Self::Int,
            Self::FloatList => Self::Float,
            scalar => scalar,
        }
    }

    /// Parse one textual value. List kinds split `raw` on commas.
    pub fn parse(self, raw: &str) -> Result<FlagValue, String> {
        match self {
            Self::String => Ok(FlagValue::String(raw.to_string())),
            Self::Bool => parse_bool_value(raw).map(FlagValue::Bool),
            Self::Int => parse_int(raw).map(FlagValue::Int),
            Self::Float => parse_float(raw).map(FlagValue::Float),
            Self::Duration => parse_duration(raw).map(FlagValue::Duration),
            list if raw.is_empty() => list.parse_items(&[]),
            list => {
                let items: Vec<&str> = raw.split(',').collect();
                list.parse_items(&items)
            }
        }
    }

    /// Parse every occurrence collected by the parser. Scalars keep the
    /// last occurrence; no occurrence yields the zero value.
    pub fn parse_all(self, raw: &[String]) -> Result<FlagValue, String> {
        let items: Vec<&str> = raw.iter().map(String::as_str).collect();
        self.parse_items(&items)
    }

    fn parse_items(self, items: &[&str]) -> Result<FlagValue, String> {
        Ok(match self {
            Self::StringList => {
                FlagValue::StringList(items.iter().map(|s| (*s).to_string()).collect())
            }
            Self::BoolList => FlagValue::BoolList(
                items
                    .iter()
                    .map(|s| parse_bool_value(s))
                    .collect::<Result<_, _>>()?,
            ),
            Self::IntList => {
                FlagValue::IntList(items.iter().map(|s| parse_int(s)).collect::<Result<_, _>>()?)
            }
            Self::FloatList => FlagValue::FloatList(
                items.iter().map(|s| parse_float(s)).collect::<Result<_, _>>()?,
            ),
            scalar => match items.last() {
                Some(raw) => scalar.parse(raw)?,
                None => scalar.zero(),
            },
        })
    }

    /// The value a field of this kind holds before anything is assigned.
    pub fn zero(self) -> FlagValue {
        match self {
            Self::String => FlagValue::String(String::new()),
            Self::Bool => FlagValue::Bool(false),
            Self::Int => FlagValue::Int(0),
            Self::Float => FlagValue::Float(0.0),
            Self::Duration => FlagValue::Duration(Duration::ZERO),
            Self::StringList => FlagValue::StringList(Vec::new()),
            Self::BoolList => FlagValue::BoolList(Vec::new()),
            Self::IntList => FlagValue::IntList(Vec::new()),
            Self::FloatList => FlagValue::FloatList(Vec::new()),
        }
    }
}

fn parse_bool_value(raw: &str) -> Result<bool, String> {
    parse_bool(raw.trim()).ok_or_else(|| format!("{raw:?} is not a boolean"))
}

fn parse_int(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{raw:?} is not an integer"))
}

fn parse_float(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{raw:?} is not a number"))
}

/// A typed flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    /// Text.
    String(String),
    /// Switch.
    Bool(bool),
    /// Integer, widened to `i64`.
    Int(i64),
    /// Floating point, widened to `f64`.
    Float(f64),
    /// Duration.
    Duration(Duration),
    /// Texts.
    StringList(Vec<String>),
    /// Switches.
    BoolList(Vec<bool>),
    /// Integers.
    IntList(Vec<i64>),
    /// Floating point numbers.
    FloatList(Vec<f64>),
}

impl FlagValue {
    /// Kind this value belongs to.
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::String(_) => FlagKind::String,
            Self::Bool(_) => FlagKind::Bool,
            Self::Int(_) => FlagKind::Int,
            Self::Float(_) => FlagKind::Float,
            Self::Duration(_) => FlagKind::Duration,
            Self::StringList(_) => FlagKind::StringList,
            Self::BoolList(_) => FlagKind::BoolList,
            Self::IntList(_) => FlagKind::IntList,
            Self::FloatList(_) => FlagKind::FloatList,
        }
    }

    /// Whether this is the zero value of its kind.
    pub fn is_zero(&self) -> bool {
        *self == self.kind().zero()
    }

    /// Textual form accepted back by [`FlagKind::parse_all`].
    pub fn to_strings(&self) -> Vec<String> {
        fn each<T: ToString>(items: &[T]) -> Vec<String> {
            items.iter().map(ToString::to_string).collect()
        }
        match self {
            Self::StringList(v) => v.clone(),
            Self::BoolList(v) => each(v),
            Self::IntList(v) => each(v),
            Self::FloatList(v) => each(v),
            scalar => vec![scalar.to_string()],
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Duration(d) => f.write_str(&format_duration(*d)),
            list => f.write_str(&list.to_strings().join(",")),
        }
    }
}

/// A struct field that can hold a flag value.
pub trait FlagField {
    /// Value type.
    fn kind(&self) -> FlagKind;
    /// Current value.
    fn value(&self) -> FlagValue;
    /// Overwrite the field. Fails on a kind mismatch or an out-of-range
    /// integer.
    fn assign(&mut self, value: FlagValue) -> Result<(), String>;
}

fn mismatch(want: FlagKind, got: &FlagValue) -> String {
    format!("expected a {want:?} value, got {:?}", got.kind())
}

impl FlagField for String {
    fn kind(&self) -> FlagKind {
        FlagKind::String
    }

    fn value(&self) -> FlagValue {
        FlagValue::String(self.clone())
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::String(s) => {
                *self = s;
                Ok(())
            }
            other => Err(mismatch(FlagKind::String, &other)),
        }
    }
}

impl FlagField for bool {
    fn kind(&self) -> FlagKind {
        FlagKind::Bool
    }

    fn value(&self) -> FlagValue {
        FlagValue::Bool(*self)
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(mismatch(FlagKind::Bool, &other)),
        }
    }
}

impl FlagField for Duration {
    fn kind(&self) -> FlagKind {
        FlagKind::Duration
    }

    fn value(&self) -> FlagValue {
        FlagValue::Duration(*self)
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::Duration(d) => {
                *self = d;
                Ok(())
            }
            other => Err(mismatch(FlagKind::Duration, &other)),
        }
    }
}

macro_rules! int_field {
    ($($ty:ty),*) => {$(
        impl FlagField for $ty {
            fn kind(&self) -> FlagKind {
                FlagKind::Int
            }

            fn value(&self) -> FlagValue {
                FlagValue::Int(i64::from(*self))
            }

            fn assign(&mut self, value: FlagValue) -> Result<(), String> {
                match value {
                    FlagValue::Int(n) => {
                        *self = <$ty>::try_from(n)
                            .map_err(|_| format!("{n} is out of range for {}", stringify!($ty)))?;
                        Ok(())
                    }
                    other => Err(mismatch(FlagKind::Int, &other)),
                }
            }
        }
    )*};
}

int_field!(i8, i16, i32, i64, u8, u16, u32);

impl FlagField for f64 {
    fn kind(&self) -> FlagKind {
        FlagKind::Float
    }

    fn value(&self) -> FlagValue {
        FlagValue::Float(*self)
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::Float(x) => {
                *self = x;
                Ok(())
            }
            other => Err(mismatch(FlagKind::Float, &other)),
        }
    }
}

impl FlagField for f32 {
    fn kind(&self) -> FlagKind {
        FlagKind::Float
    }

    fn value(&self) -> FlagValue {
        FlagValue::Float(f64::from(*self))
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::Float(x) => {
                *self = x as f32;
                Ok(())
            }
            other => Err(mismatch(FlagKind::Float, &other)),
        }
    }
}

impl FlagField for Vec<String> {
    fn kind(&self) -> FlagKind {
        FlagKind::StringList
    }

    fn value(&self) -> FlagValue {
        FlagValue::StringList(self.clone())
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::StringList(v) => {
                *self = v;
                Ok(())
            }
            other => Err(mismatch(FlagKind::StringList, &other)),
        }
    }
}

impl FlagField for Vec<bool> {
    fn kind(&self) -> FlagKind {
        FlagKind::BoolList
    }

    fn value(&self) -> FlagValue {
        FlagValue::BoolList(self.clone())
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::BoolList(v) => {
                *self = v;
                Ok(())
            }
            other => Err(mismatch(FlagKind::BoolList, &other)),
        }
    }
}

impl FlagField for Vec<i64> {
    fn kind(&self) -> FlagKind {
        FlagKind::IntList
    }

    fn value(&self) -> FlagValue {
        FlagValue::IntList(self.clone())
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::IntList(v) => {
                *self = v;
                Ok(())
            }
            other => Err(mismatch(FlagKind::IntList, &other)),
        }
    }
}

impl FlagField for Vec<i32> {
    fn kind(&self) -> FlagKind {
        FlagKind::IntList
    }

    fn value(&self) -> FlagValue {
        FlagValue::IntList(self.iter().map(|n| i64::from(*n)).collect())
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::IntList(v) => {
                *self = v
                    .into_iter()
                    .map(|n| i32::try_from(n).map_err(|_| format!("{n} is out of range for i32")))
                    .collect::<Result<_, _>>()?;
                Ok(())
            }
            other => Err(mismatch(FlagKind::IntList, &other)),
        }
    }
}

impl FlagField for Vec<f64> {
    fn kind(&self) -> FlagKind {
        FlagKind::FloatList
    }

    fn value(&self) -> FlagValue {
        FlagValue::FloatList(self.clone())
    }

    fn assign(&mut self, value: FlagValue) -> Result<(), String> {
        match value {
            FlagValue::FloatList(v) => {
                *self = v;
                Ok(())
            }
            other => Err(mismatch(FlagKind::FloatList, &other)),
        }
    }
}

/// One declared field of a flags struct.
pub struct FieldInfo<'a> {
    /// Rust field name.
    pub name: &'static str,
    /// `(tag, value)` pairs in declaration order.
    pub tags: &'static [(&'static str, &'static str)],
    /// The field itself.
    pub field: &'a dyn FlagField,
}

impl fmt::Debug for FieldInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("value", &self.field.value())
            .finish()
    }
}

/// A struct whose fields are flags. Implemented by [`flag_set!`](crate::flag_set).
pub trait FlagSet {
    /// Fields in declaration order.
    fn fields(&self) -> Vec<FieldInfo<'_>>;
    /// Mutable access to the field called `name`.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn FlagField>;
}

/// Declare a flags struct.
///
/// ```rust
/// use std::time::Duration;
///
/// meroxa_builder::flag_set! {
///     #[derive(Debug, Default)]
///     pub struct ListFlags {
///         #[flag(long = "type", short = "t", usage = "filter by resource type")]
///         pub kind: String,
///         #[flag(long = "timeout", default = "30s", hidden = "true")]
///         pub timeout: Duration,
///     }
/// }
///
/// let flags = meroxa_builder::build_flags(&ListFlags::default());
/// assert_eq!(flags[0].long, "type");
/// assert_eq!(flags[1].default.to_string(), "30s");
/// ```
#[macro_export]
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                #[flag($($tag:ident = $val:literal),* $(,)?)]
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::flags::FlagSet for $name {
            fn fields(&self) -> ::std::vec::Vec<$crate::flags::FieldInfo<'_>> {
                ::std::vec![$(
                    $crate::flags::FieldInfo {
                        name: ::std::stringify!($field),
                        tags: &[$((::std::stringify!($tag), $val)),*],
                        field: &self.$field,
                    }
                ),*]
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::std::option::Option<&mut dyn $crate::flags::FlagField> {
                $(
                    if name == ::std::stringify!($field) {
                        return ::std::option::Option::Some(&mut self.$field);
                    }
                )*
                let _ = name;
                ::std::option::Option::None
            }
        }
    };
}

/// Where a parsed flag value goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The named field of the command's flags struct.
    Field(&'static str),
    /// The `--force` / `--yolo` switches of confirmable commands.
    SkipConfirm,
    /// The `--no-headers` switch of table-printing commands.
    HideHeaders,
}

/// Normalized description of one command-line flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    /// Long name without dashes. Never empty.
    pub long: String,
    /// Single-character shorthand.
    pub short: Option<char>,
    /// Help text.
    pub usage: String,
    /// Value type.
    pub kind: FlagKind,
    /// Value used when the flag is absent.
    pub default: FlagValue,
    /// Must be given on the command line.
    pub required: bool,
    /// Inherited by every subcommand.
    pub persistent: bool,
    /// Left out of help output.
    pub hidden: bool,
    /// Write-back target.
    pub target: Target,
}

impl Flag {
    /// A boolean switch that is not backed by a struct field.
    pub fn switch(long: &str, short: Option<char>, usage: &str, target: Target) -> Self {
        Self {
            long: long.to_string(),
            short,
            usage: usage.to_string(),
            kind: FlagKind::Bool,
            default: FlagValue::Bool(false),
            required: false,
            persistent: false,
            hidden: false,
            target,
        }
    }

    /// Mark the flag hidden.
    #[must_use]
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Parser definition for this flag. Required persistent flags are
    /// checked when the selected command runs, since clap cannot require a
    /// global arg.
    pub(crate) fn to_arg(&self) -> Arg {
        let item = self.kind.item();
        let mut arg = Arg::new(self.long.clone())
            .long(self.long.clone())
            .required(self.required && !self.persistent)
            .hide(self.hidden)
            .global(self.persistent)
            .value_parser(move |raw: &str| item.parse(raw).map(|_| raw.to_string()));
        if !self.usage.is_empty() {
            arg = arg.help(self.usage.clone());
        }
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        arg = match self.kind {
            FlagKind::Bool => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_name("BOOL"),
            kind if kind.is_list() => arg.action(ArgAction::Append).value_delimiter(','),
            _ => arg.action(ArgAction::Set),
        };
        if !self.default.is_zero() {
            arg = arg.default_values(self.default.to_strings());
        }
        arg
    }
}

/// Derive flag descriptors from a flags struct, one per field, in
/// declaration order.
///
/// # Panics
///
/// On descriptor-authoring mistakes: a boolean tag that is not a boolean, a
/// `short` tag longer than one character, a `default` that does not parse
/// as the field's type, or an unknown tag.
#[allow(clippy::panic)]
pub fn build_flags(set: &dyn FlagSet) -> Vec<Flag> {
    set.fields()
        .iter()
        .map(|info| {
            let kind = info.field.kind();
            let mut flag = Flag {
                long: String::new(),
                short: None,
                usage: String::new(),
                kind,
                default: info.field.value(),
                required: false,
                persistent: false,
                hidden: false,
                target: Target::Field(info.name),
            };
            for &(tag, raw) in info.tags {
                match tag {
                    "long" => flag.long = raw.to_string(),
                    "short" => flag.short = parse_short(info.name, raw),
                    "usage" => flag.usage = raw.to_string(),
                    "required" => flag.required = parse_tag_bool(info.name, tag, raw),
                    "persistent" => flag.persistent = parse_tag_bool(info.name, tag, raw),
                    "hidden" => flag.hidden = parse_tag_bool(info.name, tag, raw),
                    "default" => {
                        flag.default = kind.parse(raw).unwrap_or_else(|e| {
                            panic!("flag field {}: invalid default {raw:?}: {e}", info.name)
                        });
                    }
                    other => panic!("flag field {}: unknown tag {other:?}", info.name),
                }
            }
            flag
        })
        .collect()
}

#[allow(clippy::panic)]
fn parse_tag_bool(field: &str, tag: &str, raw: &str) -> bool {
    parse_bool(raw).unwrap_or_else(|| {
        panic!("flag field {field}: tag {tag} must be a boolean, got {raw:?}")
    })
}

#[allow(clippy::panic)]
fn parse_short(field: &str, raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    let short = chars.next();
    if chars.next().is_some() {
        panic!("flag field {field}: short name {raw:?} must be a single character");
    }
    short
}

/// Parse a duration such as `1h30m`, `10s`, `1.5h` or `250ms`. Units are
/// `ns`, `us`, `µs`, `ms`, `s`, `m` and `h`; a bare `0` is allowed.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = s;
    let mut nanos = 0f64;
    while !rest.is_empty() {
        let num_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if num_end == 0 {
            return Err(format!("invalid duration {s:?}"));
        }
        let (num, tail) = rest.split_at(num_end);
        let unit_end = tail.find(is_number).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in duration {s:?}")),
            other => return Err(format!("unknown unit {other:?} in duration {s:?}")),
        };
        let value: f64 = num
            .parse()
            .map_err(|_| format!("invalid duration {s:?}"))?;
        nanos += value * scale;
        rest = next;
    }
    let nanos = nanos.round();
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(format!("invalid duration {s:?}: out of range"));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

/// Format a duration the way [`parse_duration`] reads it, e.g. `1h30m`.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    if d.subsec_nanos() % 1_000_000 != 0 {
        return format!("{}ns", d.as_nanos());
    }
    if d.subsec_millis() != 0 {
        return format!("{}ms", d.as_millis());
    }
    let secs = d.as_secs();
    let mut out = String::new();
    for (amount, unit) in [(secs / 3600, 'h'), (secs % 3600 / 60, 'm'), (secs % 60, 's')] {
        if amount > 0 {
            let _ = write!(out, "{amount}{unit}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    crate::flag_set! {
        #[derive(Debug, Default)]
        struct Sample {
            #[flag(long = "name", short = "n", usage = "resource name", required = "true")]
            name: String,
            #[flag(long = "count", default = "3")]
            count: i32,
            #[flag(long = "verbose", hidden = "T")]
            verbose: bool,
            #[flag(long = "timeout", default = "1m30s", persistent = "1")]
            timeout: Duration,
            #[flag(long = "tags")]
            tags: Vec<String>,
        }
    }

    crate::flag_set! {
        #[derive(Default)]
        struct Empty {}
    }

    crate::flag_set! {
        #[derive(Default)]
        struct BadRequired {
            #[flag(long = "x", required = "yes")]
            x: String,
        }
    }

    crate::flag_set! {
        #[derive(Default)]
        struct BadPersistent {
            #[flag(long = "x", persistent = "maybe")]
            x: bool,
        }
    }

    crate::flag_set! {
        #[derive(Default)]
        struct BadDefault {
            #[flag(long = "wait", default = "soon")]
            wait: Duration,
        }
    }

    crate::flag_set! {
        #[derive(Default)]
        struct BadShort {
            #[flag(long = "x", short = "xy")]
            x: String,
        }
    }

    crate::flag_set! {
        #[derive(Default)]
        struct UnknownTag {
            #[flag(long = "x", env = "X")]
            x: String,
        }
    }

    #[test]
    fn one_descriptor_per_field_in_order() {
        let flags = build_flags(&Sample::default());
        let longs: Vec<&str> = flags.iter().map(|f| f.long.as_str()).collect();
        assert_eq!(longs, vec!["name", "count", "verbose", "timeout", "tags"]);
        let targets: Vec<Target> = flags.iter().map(|f| f.target).collect();
        assert_eq!(
            targets,
            vec![
                Target::Field("name"),
                Target::Field("count"),
                Target::Field("verbose"),
                Target::Field("timeout"),
                Target::Field("tags"),
            ]
        );
    }

    #[test]
    fn tags_are_applied() {
        let flags = build_flags(&Sample::default());
        assert_eq!(flags[0].short, Some('n'));
        assert_eq!(flags[0].usage, "resource name");
        assert!(flags[0].required);
        assert!(!flags[1].required);
        assert!(flags[2].hidden);
        assert!(flags[3].persistent);
        assert!(!flags[0].persistent);
    }

    #[test]
    fn defaults_come_from_tag_or_field() {
        let flags = build_flags(&Sample::default());
        assert_eq!(flags[0].default, FlagValue::String(String::new()));
        assert_eq!(flags[1].default, FlagValue::Int(3));
        assert_eq!(flags[3].default, FlagValue::Duration(Duration::from_secs(90)));
        assert_eq!(flags[4].default, FlagValue::StringList(Vec::new()));

        let preset = Sample {
            name: "pg".into(),
            ..Sample::default()
        };
        assert_eq!(build_flags(&preset)[0].default, FlagValue::String("pg".into()));
    }

    #[test]
    fn empty_struct_has_no_flags() {
        assert!(build_flags(&Empty::default()).is_empty());
    }

    #[test]
    #[should_panic(expected = "tag required must be a boolean")]
    fn malformed_required_panics() {
        let _ = build_flags(&BadRequired::default());
    }

    #[test]
    #[should_panic(expected = "tag persistent must be a boolean")]
    fn malformed_persistent_panics() {
        let _ = build_flags(&BadPersistent::default());
    }

    #[test]
    #[should_panic(expected = "invalid default")]
    fn malformed_default_panics() {
        let _ = build_flags(&BadDefault::default());
    }

    #[test]
    #[should_panic(expected = "must be a single character")]
    fn long_short_panics() {
        let _ = build_flags(&BadShort::default());
    }

    #[test]
    #[should_panic(expected = "unknown tag \"env\"")]
    fn unknown_tag_panics() {
        let _ = build_flags(&UnknownTag::default());
    }

    #[test]
    fn field_mut_writes_back() {
        let mut sample = Sample::default();
        sample
            .field_mut("count")
            .expect("count field")
            .assign(FlagValue::Int(12))
            .expect("assign");
        sample
            .field_mut("tags")
            .expect("tags field")
            .assign(FlagKind::StringList.parse("a,b").expect("parse"))
            .expect("assign");
        assert_eq!(sample.count, 12);
        assert_eq!(sample.tags, vec!["a", "b"]);
        assert!(sample.field_mut("nope").is_none());
    }

    #[test]
    fn assign_rejects_out_of_range_and_mismatch() {
        let mut small: i8 = 0;
        assert!(small.assign(FlagValue::Int(300)).is_err());
        assert!(small.assign(FlagValue::Bool(true)).is_err());
        small.assign(FlagValue::Int(-5)).expect("in range");
        assert_eq!(small, -5);
    }

    #[test]
    fn parse_all_keeps_last_scalar() {
        let raw = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            FlagKind::String.parse_all(&raw).expect("parse"),
            FlagValue::String("b".into())
        );
        assert_eq!(
            FlagKind::StringList.parse_all(&raw).expect("parse"),
            FlagValue::StringList(raw.clone())
        );
        assert_eq!(FlagKind::Bool.parse_all(&[]).expect("parse"), FlagValue::Bool(false));
    }

    #[test_case("10s", Duration::from_secs(10))]
    #[test_case("1h30m", Duration::from_secs(5400))]
    #[test_case("1.5h", Duration::from_secs(5400))]
    #[test_case("250ms", Duration::from_millis(250))]
    #[test_case("2us", Duration::from_micros(2))]
    #[test_case(" 0 ", Duration::ZERO)]
    fn parse_duration_accepts(raw: &str, want: Duration) {
        assert_eq!(parse_duration(raw).expect("valid"), want);
    }

    #[test_case("" ; "empty")]
    #[test_case("10" ; "missing unit")]
    #[test_case("10x" ; "unknown unit")]
    #[test_case("s" ; "missing number")]
    #[test_case("-1s" ; "negative")]
    #[test_case("99999999999999999999h" ; "overflow")]
    fn parse_duration_rejects(raw: &str) {
        assert!(parse_duration(raw).is_err());
    }

    #[test_case(Duration::ZERO, "0s")]
    #[test_case(Duration::from_secs(10), "10s")]
    #[test_case(Duration::from_secs(5400), "1h30m")]
    #[test_case(Duration::from_secs(3601), "1h1s")]
    #[test_case(Duration::from_millis(1500), "1500ms")]
    fn format_duration_round_trips(d: Duration, want: &str) {
        assert_eq!(format_duration(d), want);
        assert_eq!(parse_duration(want).expect("parse back"), d);
    }

    #[test]
    fn bool_flags_accept_bare_and_explicit_values() {
        let arg = Flag::switch("force", Some('f'), "skip confirmation", Target::SkipConfirm).to_arg();
        let cmd = clap::Command::new("t").arg(arg);

        let bare = cmd.clone().try_get_matches_from(["t", "-f"]).expect("parse");
        assert_eq!(bare.get_one::<String>("force").map(String::as_str), Some("true"));

        let explicit = cmd.clone().try_get_matches_from(["t", "--force=false"]).expect("parse");
        assert_eq!(explicit.get_one::<String>("force").map(String::as_str), Some("false"));

        assert!(cmd.try_get_matches_from(["t", "--force=maybe"]).is_err());
    }

    #[test]
    fn required_persistent_flag_is_left_optional_for_clap() {
        let flag = Flag {
            kind: FlagKind::String,
            default: FlagValue::String(String::new()),
            required: true,
            persistent: true,
            ..Flag::switch("token", None, "", Target::Field("token"))
        };
        let arg = flag.to_arg();
        assert!(arg.is_global_set());
        assert!(!arg.is_required_set());

        let local = Flag {
            persistent: false,
            ..flag
        };
        assert!(local.to_arg().is_required_set());
    }

    #[test]
    fn list_flags_split_and_accumulate() {
        let flag = Flag {
            kind: FlagKind::IntList,
            default: FlagValue::IntList(Vec::new()),
            ..Flag::switch("ports", None, "", Target::Field("ports"))
        };
        let cmd = clap::Command::new("t").arg(flag.to_arg());
        let m = cmd
            .try_get_matches_from(["t", "--ports", "80,443", "--ports=8080"])
            .expect("parse");
        let raw: Vec<String> = m.get_many::<String>("ports").expect("values").cloned().collect();
        assert_eq!(
            FlagKind::IntList.parse_all(&raw).expect("ints"),
            FlagValue::IntList(vec![80, 443, 8080])
        );
    }
}
