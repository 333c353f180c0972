//! Argument values as delivered by the GraphQL execution engine.
//!
//! `filter` and `sort` are custom scalars whose literals are handed over as
//! unparsed AST nodes, like the literal value nodes in the GraphQL grammar.

use std::fmt;

/// A GraphQL input value literal.
#[derive(Debug, Clone, PartialEq)]
pub enum AstValue {
    Variable(String),
    /// Integers keep their source text
    Int(String),
    /// Floats keep their source text
    Float(String),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<AstValue>),
    Object(Vec<ObjectField>),
}

/// One `name: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub value: AstValue,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, value: AstValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl AstValue {
    /// Kind name as used by the GraphQL AST, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AstValue::Variable(_) => "Variable",
            AstValue::Int(_) => "IntValue",
            AstValue::Float(_) => "FloatValue",
            AstValue::String(_) => "StringValue",
            AstValue::Boolean(_) => "BooleanValue",
            AstValue::Null => "NullValue",
            AstValue::Enum(_) => "EnumValue",
            AstValue::List(_) => "ListValue",
            AstValue::Object(_) => "ObjectValue",
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        AstValue::String(s.into())
    }

    pub fn int(i: i64) -> Self {
        AstValue::Int(i.to_string())
    }

    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, AstValue)>,
        S: Into<String>,
    {
        AstValue::Object(
            fields
                .into_iter()
                .map(|(name, value)| ObjectField::new(name, value))
                .collect(),
        )
    }

    pub fn as_object(&self) -> Option<&[ObjectField]> {
        match self {
            AstValue::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Variables arrive as JSON rather than literals, convert them to the literal
/// form so they take the same parsing path.
impl From<&serde_json::Value> for AstValue {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => AstValue::Null,
            serde_json::Value::Bool(b) => AstValue::Boolean(*b),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => AstValue::Int(n.to_string()),
            serde_json::Value::Number(n) => AstValue::Float(n.to_string()),
            serde_json::Value::String(s) => AstValue::String(s.clone()),
            serde_json::Value::Array(items) => AstValue::List(items.iter().map(AstValue::from).collect()),
            serde_json::Value::Object(map) => AstValue::Object(
                map.iter()
                    .map(|(name, value)| ObjectField::new(name.clone(), AstValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for AstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstValue::Variable(name) => write!(f, "${}", name),
            AstValue::Int(raw) | AstValue::Float(raw) | AstValue::Enum(raw) => write!(f, "{}", raw),
            AstValue::String(s) => write!(f, "{:?}", s),
            AstValue::Boolean(b) => write!(f, "{}", b),
            AstValue::Null => write!(f, "null"),
            AstValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            AstValue::Object(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let ast = AstValue::from(&json!({"Operation": "LIMIT", "Argument": {"Value": 2}}));
        let fields = ast.as_object().unwrap();

        assert_eq!(fields.len(), 2);
        let operation = fields.iter().find(|f| f.name == "Operation").unwrap();
        assert_eq!(operation.value, AstValue::string("LIMIT"));
        let argument = fields.iter().find(|f| f.name == "Argument").unwrap();
        assert_eq!(argument.value, AstValue::object([("Value", AstValue::int(2))]));
    }

    #[test]
    fn test_from_json_float() {
        assert_eq!(AstValue::from(&json!(1.5)), AstValue::Float("1.5".to_string()));
    }

    #[test]
    fn test_display() {
        let ast = AstValue::object([
            ("Field", AstValue::string("name")),
            ("Values", AstValue::List(vec![AstValue::string("c"), AstValue::string("d")])),
        ]);
        assert_eq!(ast.to_string(), r#"{Field: "name", Values: ["c", "d"]}"#);
    }
}
