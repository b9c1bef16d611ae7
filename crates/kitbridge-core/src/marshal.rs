// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Value marshaling between native Rust values and the host `Variant` model.
//
// The one rule that matters: absence stays absence. `None` becomes
// `Variant::Nil`, never a zero or an empty string, and `Variant::Nil` only
// converts back into an `Option`.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{BridgeError, Result};
use crate::value::{Dictionary, PackedBytes, Variant};

/// Native → host conversion.
pub trait ToVariant {
    fn to_variant(&self) -> Variant;
}

/// Host → native conversion.
pub trait FromVariant: Sized {
    fn from_variant(value: &Variant) -> Result<Self>;
}

fn mismatch(expected: &'static str, found: &Variant) -> BridgeError {
    BridgeError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

impl ToVariant for Variant {
    fn to_variant(&self) -> Variant {
        self.clone()
    }
}

impl FromVariant for Variant {
    fn from_variant(value: &Variant) -> Result<Self> {
        Ok(value.clone())
    }
}

impl ToVariant for bool {
    fn to_variant(&self) -> Variant {
        Variant::Bool(*self)
    }
}

impl FromVariant for bool {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl ToVariant for i64 {
    fn to_variant(&self) -> Variant {
        Variant::Int(*self)
    }
}

impl FromVariant for i64 {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Int(i) => Ok(*i),
            other => Err(mismatch("int", other)),
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),*) => {$(
        impl ToVariant for $ty {
            fn to_variant(&self) -> Variant {
                Variant::Int(i64::from(*self))
            }
        }

        impl FromVariant for $ty {
            fn from_variant(value: &Variant) -> Result<Self> {
                let wide = i64::from_variant(value)?;
                <$ty>::try_from(wide).map_err(|_| BridgeError::OutOfRange(stringify!($ty)))
            }
        }
    )*};
}

narrow_int!(i32, u32, u16);

impl ToVariant for u64 {
    fn to_variant(&self) -> Variant {
        // Host integers are signed 64-bit; saturate rather than wrap.
        Variant::Int(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl FromVariant for u64 {
    fn from_variant(value: &Variant) -> Result<Self> {
        let wide = i64::from_variant(value)?;
        u64::try_from(wide).map_err(|_| BridgeError::OutOfRange("u64"))
    }
}

impl ToVariant for f64 {
    fn to_variant(&self) -> Variant {
        Variant::Float(*self)
    }
}

impl FromVariant for f64 {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Float(f) => Ok(*f),
            // Scripts routinely pass `100` where `100.0` is meant.
            Variant::Int(i) => Ok(*i as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl ToVariant for str {
    fn to_variant(&self) -> Variant {
        Variant::String(self.to_owned())
    }
}

impl ToVariant for String {
    fn to_variant(&self) -> Variant {
        Variant::String(self.clone())
    }
}

impl FromVariant for String {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl ToVariant for [u8] {
    fn to_variant(&self) -> Variant {
        Variant::Bytes(PackedBytes::copy_from(self))
    }
}

impl ToVariant for PackedBytes {
    fn to_variant(&self) -> Variant {
        Variant::Bytes(self.clone())
    }
}

impl FromVariant for PackedBytes {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Bytes(b) => Ok(b.clone()),
            other => Err(mismatch("bytes", other)),
        }
    }
}

impl ToVariant for Dictionary {
    fn to_variant(&self) -> Variant {
        Variant::Dictionary(self.clone())
    }
}

impl FromVariant for Dictionary {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Dictionary(d) => Ok(d.clone()),
            other => Err(mismatch("dictionary", other)),
        }
    }
}

/// Dates cross the boundary as Unix seconds.
impl ToVariant for DateTime<Utc> {
    fn to_variant(&self) -> Variant {
        Variant::Int(self.timestamp())
    }
}

impl FromVariant for DateTime<Utc> {
    fn from_variant(value: &Variant) -> Result<Self> {
        let secs = i64::from_variant(value)?;
        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or(BridgeError::OutOfRange("timestamp"))
    }
}

impl<T: ToVariant> ToVariant for Option<T> {
    fn to_variant(&self) -> Variant {
        match self {
            Some(v) => v.to_variant(),
            None => Variant::Nil,
        }
    }
}

impl<T: FromVariant> FromVariant for Option<T> {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Nil => Ok(None),
            other => T::from_variant(other).map(Some),
        }
    }
}

impl<T: ToVariant> ToVariant for Vec<T> {
    fn to_variant(&self) -> Variant {
        Variant::Array(self.iter().map(ToVariant::to_variant).collect())
    }
}

impl<T: FromVariant> FromVariant for Vec<T> {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Array(items) => items.iter().map(T::from_variant).collect(),
            other => Err(mismatch("array", other)),
        }
    }
}

/// How a native sequence with null elements becomes a host array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPolicy {
    /// Drop null elements, keeping the relative order of the rest.
    SkipNulls,
    /// Keep one output slot per input slot, nulls become `Variant::Nil`.
    PreserveNulls,
}

/// Marshal an optional native sequence of optional elements.
///
/// A missing sequence yields an empty host array, so the list-shaped callback
/// argument is always an array.
pub fn marshal_list<I, N, F>(items: Option<I>, policy: ListPolicy, mut wrap: F) -> Variant
where
    I: IntoIterator<Item = Option<N>>,
    F: FnMut(N) -> Variant,
{
    let Some(items) = items else {
        return Variant::Array(Vec::new());
    };
    let out = items
        .into_iter()
        .filter_map(|item| match (item, policy) {
            (Some(native), _) => Some(wrap(native)),
            (None, ListPolicy::SkipNulls) => None,
            (None, ListPolicy::PreserveNulls) => Some(Variant::Nil),
        })
        .collect();
    Variant::Array(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_absent_maps_to_nil() {
        let none: Option<i64> = None;
        assert_eq!(none.to_variant(), Variant::Nil);
        assert_eq!(Some(0i64).to_variant(), Variant::Int(0));
        assert_eq!(Some(String::new()).to_variant(), Variant::String(String::new()));
    }

    #[test]
    fn nil_only_converts_to_option() {
        assert_eq!(Option::<String>::from_variant(&Variant::Nil).expect("nil"), None);
        assert!(matches!(
            String::from_variant(&Variant::Nil),
            Err(BridgeError::TypeMismatch { expected: "string", found: "nil" })
        ));
    }

    #[test]
    fn bytes_round_trip() {
        let samples: [&[u8]; 4] = [b"", b"\x00", b"\xff\x00\x7f", &[0xAB; 1024]];
        for original in samples {
            let host = original.to_variant();
            let back = PackedBytes::from_variant(&host).expect("bytes");
            assert_eq!(back.as_slice(), original);
        }
    }

    #[test]
    fn narrowing_rejects_out_of_range() {
        assert!(matches!(
            u32::from_variant(&Variant::Int(-1)),
            Err(BridgeError::OutOfRange("u32"))
        ));
        assert_eq!(i32::from_variant(&Variant::Int(42)).expect("i32"), 42);
    }

    #[test]
    fn float_accepts_integers() {
        assert_eq!(f64::from_variant(&Variant::Int(100)).expect("float"), 100.0);
    }

    #[test]
    fn dates_are_unix_seconds() {
        let date = Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid");
        assert_eq!(date.to_variant(), Variant::Int(1_700_000_000));
        assert_eq!(
            DateTime::<Utc>::from_variant(&Variant::Int(1_700_000_000)).expect("date"),
            date
        );
    }

    #[test]
    fn skip_nulls_keeps_relative_order() {
        let native = vec![Some(1), None, Some(2), None, Some(3)];
        let host = marshal_list(Some(native), ListPolicy::SkipNulls, |n: i64| Variant::Int(n));
        assert_eq!(
            host,
            Variant::Array(vec![Variant::Int(1), Variant::Int(2), Variant::Int(3)])
        );
    }

    #[test]
    fn preserve_nulls_keeps_positions() {
        let native = vec![Some(1), None, Some(3)];
        let host = marshal_list(Some(native), ListPolicy::PreserveNulls, |n: i64| Variant::Int(n));
        assert_eq!(
            host,
            Variant::Array(vec![Variant::Int(1), Variant::Nil, Variant::Int(3)])
        );
    }

    #[test]
    fn missing_list_is_empty_array() {
        let host = marshal_list(None::<Vec<Option<i64>>>, ListPolicy::SkipNulls, Variant::Int);
        assert_eq!(host, Variant::Array(Vec::new()));
    }
}
