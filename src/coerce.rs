//! A `serde_json::Value` deserializer that accepts strings where numbers or
//! booleans are expected, and scalars where strings are expected.
//!
//! Placeholder substitutions and `PREFIX__KEY` variables always produce
//! strings, so `max_connections: "${MAX_CONN-10}"` must still decode into a
//! `u32`. Everything else behaves like `serde_json::Value`'s own
//! deserializer.

use serde::Deserializer;
use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};

type Error = serde_json::Error;

/// Deserializer over an owned value with string coercion.
pub struct Coercing(pub Value);

macro_rules! coerce_number {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            if let Value::String(s) = &self.0
                && let Ok(n) = s.trim().parse::<$ty>()
            {
                return visitor.$visit(n);
            }
            self.deserialize_any(visitor)
        }
    };
}

impl<'de> Deserializer<'de> for Coercing {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(CoercingMap::new(map)),
            Value::Array(items) => visitor.visit_seq(CoercingSeq::new(items)),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        if let Value::String(s) = &self.0 {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => return visitor.visit_bool(true),
                "false" | "no" | "off" | "0" => return visitor.visit_bool(false),
                _ => {}
            }
        }
        self.deserialize_any(visitor)
    }

    coerce_number!(deserialize_i8, visit_i64, i64);
    coerce_number!(deserialize_i16, visit_i64, i64);
    coerce_number!(deserialize_i32, visit_i64, i64);
    coerce_number!(deserialize_i64, visit_i64, i64);
    coerce_number!(deserialize_i128, visit_i128, i128);
    coerce_number!(deserialize_u8, visit_u64, u64);
    coerce_number!(deserialize_u16, visit_u64, u64);
    coerce_number!(deserialize_u32, visit_u64, u64);
    coerce_number!(deserialize_u64, visit_u64, u64);
    coerce_number!(deserialize_u128, visit_u128, u128);
    coerce_number!(deserialize_f32, visit_f64, f64);
    coerce_number!(deserialize_f64, visit_f64, f64);

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Number(n) => visitor.visit_string(n.to_string()),
            Value::Bool(b) => visitor.visit_string(b.to_string()),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(Coercing(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.0.deserialize_unit(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        drop(self);
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        char bytes byte_buf unit_struct seq tuple tuple_struct map struct identifier
    }
}

struct CoercingMap {
    iter: serde_json::map::IntoIter,
    value: Option<Value>,
    len: usize,
}

impl CoercingMap {
    fn new(map: Map<String, Value>) -> Self {
        Self {
            len: map.len(),
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for CoercingMap {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                self.len -= 1;
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        match self.value.take() {
            Some(value) => seed.deserialize(Coercing(value)),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len)
    }
}

struct CoercingSeq {
    iter: std::vec::IntoIter<Value>,
}

impl CoercingSeq {
    fn new(items: Vec<Value>) -> Self {
        Self {
            iter: items.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for CoercingSeq {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, Error> {
        match self.iter.next() {
            Some(value) => seed.deserialize(Coercing(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
