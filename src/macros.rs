/// Builds a [`CborValue`](crate::CborValue) from JSON-like syntax.
///
/// Map keys must be string literals. Any other expression is converted with
/// `CborValue::from`.
///
/// ```rust
/// use serde_cbor_writer::{cbor, CborValue};
///
/// let value = cbor!({
///     "name": "Alice",
///     "tags": ["a", "b"],
///     "admin": false
/// });
/// assert_eq!(value.as_map().map(|m| m.len()), Some(3));
/// ```
#[macro_export]
macro_rules! cbor {
    (null) => {
        $crate::CborValue::Null
    };

    (true) => {
        $crate::CborValue::Bool(true)
    };

    (false) => {
        $crate::CborValue::Bool(false)
    };

    ([]) => {
        $crate::CborValue::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::CborValue::Array(vec![$($crate::cbor!($elem)),*])
    };

    ({}) => {
        $crate::CborValue::Map($crate::CborMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::CborMap::new();
        $(
            map.insert($key.to_string(), $crate::cbor!($value));
        )*
        $crate::CborValue::Map(map)
    }};

    ($other:expr) => {
        $crate::CborValue::from($other)
    };
}
