//! Purpose: Type-directed conversion from an untyped node to a Rust value.
//! Exports: `FromNode`.
//! Role: Open registry; each supported result type is one `FromNode` impl.
//! Invariants: Converters never panic and never fail loudly; a decline is `None`.
//! Invariants: Requesting an unsupported type is a build error, not a run-time `None`.
//! Invariants: Text converters return the payload unchanged (no truncation or re-encoding).
use serde_json::Number;

use crate::core::node::Node;
use crate::core::tree::{NodeKind, Tree};

/// Converts a node into `Self`, or declines with `None`.
///
/// Implement this to make a new type extractable:
///
/// ```
/// use jsonview::api::{parse, FromNode, Node, Tree};
///
/// struct Id(String);
///
/// impl<'a> FromNode<'a> for Id {
///     fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
///         node.get("id").extract_opt::<String>().map(Id)
///     }
/// }
///
/// let doc = parse(r#"{"id":"abcd"}"#);
/// let id: Id = doc.extract().unwrap();
/// assert_eq!(id.0, "abcd");
/// ```
///
/// Types without an impl do not compile:
///
/// ```compile_fail
/// use jsonview::api::parse;
///
/// struct Unregistered;
/// let doc = parse("1");
/// let _ = doc.extract_opt::<Unregistered>();
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be extracted from a JSON node",
    label = "no `FromNode` impl for `{Self}`",
    note = "implement `FromNode<'a>` for `{Self}` to register a converter"
)]
pub trait FromNode<'a>: Sized {
    fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self>;
}

fn number<'a, T: Tree + ?Sized>(node: Node<'a, T>) -> Option<&'a Number> {
    let tree = node.tree()?;
    tree.number(node.id()?)
}

// Numbers past the `f64` range read back as infinities.
fn float(number: &Number) -> Option<f64> {
    number
        .as_f64()
        .or_else(|| number.to_string().parse::<f64>().ok())
}

// Exact when the payload is an in-range integer; otherwise saturates at the
// target bounds, and fractional payloads truncate toward zero.
macro_rules! int_from_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'a> FromNode<'a> for $ty {
                fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
                    let number = number(node)?;
                    if let Some(value) = number.as_i64() {
                        return Some(<$ty>::try_from(value).unwrap_or(if value < 0 {
                            <$ty>::MIN
                        } else {
                            <$ty>::MAX
                        }));
                    }
                    if let Some(value) = number.as_u64() {
                        return Some(<$ty>::try_from(value).unwrap_or(<$ty>::MAX));
                    }
                    float(number).map(|value| value as $ty)
                }
            }
        )*
    };
}

int_from_node!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<'a> FromNode<'a> for f64 {
    fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
        float(number(node)?)
    }
}

impl<'a> FromNode<'a> for f32 {
    fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
        float(number(node)?).map(|value| value as f32)
    }
}

impl<'a> FromNode<'a> for bool {
    fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
        match node.kind()? {
            NodeKind::True => Some(true),
            NodeKind::False => Some(false),
            _ => None,
        }
    }
}

impl<'a> FromNode<'a> for &'a str {
    fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
        let tree = node.tree()?;
        tree.string(node.id()?)
    }
}

impl<'a> FromNode<'a> for String {
    fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
        <&str>::from_node(node).map(str::to_owned)
    }
}

/// Every element must convert; one decline makes the whole array decline.
impl<'a, V: FromNode<'a>> FromNode<'a> for Vec<V> {
    fn from_node<T: Tree + ?Sized>(node: Node<'a, T>) -> Option<Self> {
        if node.kind()? != NodeKind::Array {
            return None;
        }
        node.children().map(V::from_node).collect()
    }
}
