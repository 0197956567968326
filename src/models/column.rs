use serde::Deserialize;

/// A column descriptor from the first metadata-bearing result page.
///
/// # Example (JSON representation)
///
/// ```json
/// {
///   "name": "_col0",
///   "type": "integer",
///   "typeSignature": { "rawType": "integer", "typeArguments": [], "literalArguments": [] }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct QueryColumn {
    /// Column name.
    pub name: String,

    /// Declared type, e.g. `array(varchar(10))`.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Structured type signature; informational only, the declared type
    /// string drives conversion.
    #[serde(rename = "typeSignature", default)]
    pub type_signature: Option<TypeSignature>,
}

/// Structured form of a declared type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeSignature {
    #[serde(rename = "rawType", default)]
    pub raw_type: String,
    #[serde(rename = "typeArguments", default)]
    pub type_arguments: Vec<serde_json::Value>,
    #[serde(rename = "literalArguments", default)]
    pub literal_arguments: Vec<serde_json::Value>,
}
