// Strongly-typed method descriptor. No serde_json::Value past this boundary.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

// ------------------------------- Types ----------------------------------- //

/// Kind at the bottom of a parameter type, before array dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Integer,
    Long,
    Double,
    Float,
    Boolean,
    Character,
    String,
    ListNode,
    TreeNode,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Integer => "integer",
            BaseType::Long => "long",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Boolean => "boolean",
            BaseType::Character => "character",
            BaseType::String => "string",
            BaseType::ListNode => "ListNode",
            BaseType::TreeNode => "TreeNode",
        }
    }

    fn parse(token: &str) -> Option<BaseType> {
        let t = token.trim();
        let out = match t.to_ascii_lowercase().as_str() {
            "integer" | "int" => BaseType::Integer,
            "long" => BaseType::Long,
            "double" => BaseType::Double,
            "float" => BaseType::Float,
            "boolean" | "bool" => BaseType::Boolean,
            "character" | "char" => BaseType::Character,
            "string" => BaseType::String,
            "listnode" => BaseType::ListNode,
            "treenode" => BaseType::TreeNode,
            _ => return None,
        };
        Some(out)
    }

    /// Recursive types decode through a flat array encoding.
    pub fn is_recursive(&self) -> bool {
        matches!(self, BaseType::ListNode | BaseType::TreeNode)
    }
}

/// Parameter type: a base kind plus 0..=2 array dimensions.
///
/// Textual forms round-trip: `integer`, `integer[]`, `integer[][]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct SemanticType {
    pub base: BaseType,
    pub dims: u8,
}

impl SemanticType {
    pub fn scalar(base: BaseType) -> Self {
        SemanticType { base, dims: 0 }
    }

    pub fn is_array(&self) -> bool {
        self.dims > 0
    }

    /// Type of one element, for array types.
    pub fn elem(&self) -> Option<SemanticType> {
        (self.dims > 0).then(|| SemanticType {
            base: self.base,
            dims: self.dims - 1,
        })
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.as_str())?;
        for _ in 0..self.dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        let mut dims: u8 = 0;
        while let Some(stripped) = rest.strip_suffix("[]") {
            dims += 1;
            rest = stripped.trim_end();
        }
        if dims > 2 {
            return Err(format!("too many array dimensions in '{s}'"));
        }
        let base = BaseType::parse(rest).ok_or_else(|| format!("unknown type '{s}'"))?;
        Ok(SemanticType { base, dims })
    }
}

impl TryFrom<String> for SemanticType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SemanticType> for String {
    fn from(ty: SemanticType) -> String {
        ty.to_string()
    }
}

impl serde::Serialize for SemanticType {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(self)
    }
}

/// One declared parameter of the solving method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SemanticType,
    #[serde(default)]
    pub nullable: bool,
}

/// Declared return of the solving method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnType {
    #[default]
    Void,
    Value(SemanticType),
}

impl ReturnType {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnType::Void)
    }

    pub fn value(&self) -> Option<&SemanticType> {
        match self {
            ReturnType::Void => None,
            ReturnType::Value(ty) => Some(ty),
        }
    }
}

// ------------------------------ Descriptor -------------------------------- //

/// Catalog metadata for one problem's solving method.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodMeta {
    #[serde(default, deserialize_with = "de_params")]
    pub params: Vec<Param>,
    #[serde(rename = "return", default, deserialize_with = "de_return")]
    pub ret: ReturnType,
}

impl MethodMeta {
    /// Deserialize with JSON-path context in error messages.
    pub fn from_json_str(src: &str) -> Result<Self, Error> {
        let de = &mut serde_json::Deserializer::from_str(src);
        match serde_path_to_error::deserialize::<_, MethodMeta>(de) {
            Ok(v) => Ok(v),
            Err(err) => {
                let path = err.path().to_string();
                Err(Error::Meta(format!("at JSON path {path} → {}", err.into_inner())))
            }
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Catalogs sometimes double-encode the parameter list as a JSON string.
/// Accept both; an undecodable string degrades to an empty list rather than
/// failing the whole descriptor.
fn de_params<'de, D>(de: D) -> Result<Vec<Param>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<Param>),
        Text(String),
    }
    match Raw::deserialize(de)? {
        Raw::List(v) => Ok(v),
        Raw::Text(s) => match serde_json::from_str::<Vec<Param>>(&s) {
            Ok(v) => Ok(v),
            Err(err) => {
                tracing::debug!(%err, "params string did not decode, treating as empty");
                Ok(Vec::new())
            }
        },
    }
}

fn de_return<'de, D>(de: D) -> Result<ReturnType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct RetSpec {
        #[serde(rename = "type")]
        ty: String,
    }
    let spec = Option::<RetSpec>::deserialize(de)?;
    match spec {
        None => Ok(ReturnType::Void),
        Some(spec) if spec.ty.trim().eq_ignore_ascii_case("void") => Ok(ReturnType::Void),
        Some(spec) => {
            let ty: SemanticType = spec.ty.parse().map_err(serde::de::Error::custom)?;
            Ok(ReturnType::Value(ty))
        }
    }
}

// -------------------------------- Tests ----------------------------------- //
