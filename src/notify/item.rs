//! Notification payloads.

use std::any::Any;
use std::fmt;

/// Opaque payload delivered with a notification.
///
/// The board never looks inside; receivers that understand a category
/// downcast the payload with [`downcast_ref`](dyn BbItem::downcast_ref).
pub trait BbItem: fmt::Debug {
    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Short type label for diagnostics.
    fn class_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<'a> dyn BbItem + 'a {
    /// Returns the payload as `T` if that is its concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// General-purpose payload for categories that carry a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum BbValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// No value (pure change signal).
    Empty,
}

impl BbValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BbValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl BbItem for BbValue {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn class_name(&self) -> &'static str {
        "BbValue"
    }
}

impl fmt::Display for BbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BbValue::Int(v) => write!(f, "Int({v})"),
            BbValue::Float(v) => write!(f, "Float({v})"),
            BbValue::Text(s) => write!(f, "Text({s:?})"),
            BbValue::Empty => write!(f, "Empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_to_concrete_payload() {
        let item: Box<dyn BbItem> = Box::new(BbValue::Int(5));
        assert_eq!(item.downcast_ref::<BbValue>(), Some(&BbValue::Int(5)));
        assert!(item.downcast_ref::<String>().is_none());
    }

    #[test]
    fn text_accessor() {
        assert_eq!(BbValue::Text("rx".into()).as_text(), Some("rx"));
        assert_eq!(BbValue::Empty.as_text(), None);
    }

    #[test]
    fn class_name_of_value() {
        let item: &dyn BbItem = &BbValue::Empty;
        assert_eq!(item.class_name(), "BbValue");
    }
}
