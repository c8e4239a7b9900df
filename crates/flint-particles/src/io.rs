//! Attribute descriptors used to import and export zone/emitter/modifier
//! parameters without tying the engine to a storage format.

use glam::Vec3;

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f32),
    Int(i64),
    Bool(bool),
    Vec3(Vec3),
    Text(String),
}

impl AttributeValue {
    /// Floats and integers both read as floats
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            AttributeValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A named attribute, possibly without a value yet
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    value: Option<AttributeValue>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&AttributeValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: AttributeValue) {
        self.value = Some(value);
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

/// Ordered set of attributes describing one persisted object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
    type_name: String,
    attributes: Vec<Attribute>,
}

impl Descriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the attribute's value only when one has been set
    pub fn attribute_with_value(&self, name: &str) -> Option<&AttributeValue> {
        self.attribute(name).and_then(Attribute::value)
    }

    /// Returns the attribute, declaring it if it does not exist yet
    pub fn attribute_mut(&mut self, name: &str) -> &mut Attribute {
        let idx = match self.attributes.iter().position(|a| a.name == name) {
            Some(idx) => idx,
            None => {
                self.attributes.push(Attribute::new(name));
                self.attributes.len() - 1
            }
        };
        &mut self.attributes[idx]
    }

    /// Reads a float attribute, falling back to `default` when absent or mistyped
    pub fn f32_or(&self, name: &str, default: f32) -> f32 {
        self.attribute_with_value(name)
            .and_then(AttributeValue::as_f32)
            .unwrap_or(default)
    }

    pub fn vec3_or(&self, name: &str, default: Vec3) -> Vec3 {
        self.attribute_with_value(name)
            .and_then(AttributeValue::as_vec3)
            .unwrap_or(default)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.attribute_with_value(name)
            .and_then(AttributeValue::as_bool)
            .unwrap_or(default)
    }

    /// Build a descriptor from a TOML table. Three-element numeric arrays become
    /// `Vec3`; other arrays and nested tables are skipped.
    pub fn from_toml(type_name: &str, table: &toml::value::Table) -> Self {
        let mut descriptor = Self::new(type_name);
        for (key, value) in table {
            if let Some(v) = toml_attribute(value) {
                descriptor.attribute_mut(key).set_value(v);
            }
        }
        descriptor
    }

    /// Write every valued attribute into a TOML table
    pub fn to_toml(&self) -> toml::value::Table {
        let mut table = toml::value::Table::new();
        table.insert("type".to_string(), toml::Value::String(self.type_name.clone()));
        for attr in &self.attributes {
            let Some(value) = attr.value() else {
                continue;
            };
            let v = match value {
                AttributeValue::Float(f) => toml::Value::Float(*f as f64),
                AttributeValue::Int(i) => toml::Value::Integer(*i),
                AttributeValue::Bool(b) => toml::Value::Boolean(*b),
                AttributeValue::Vec3(v) => toml::Value::Array(
                    v.to_array()
                        .iter()
                        .map(|c| toml::Value::Float(*c as f64))
                        .collect(),
                ),
                AttributeValue::Text(s) => toml::Value::String(s.clone()),
            };
            table.insert(attr.name.clone(), v);
        }
        table
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_attribute(v: &toml::Value) -> Option<AttributeValue> {
    match v {
        toml::Value::Float(f) => Some(AttributeValue::Float(*f as f32)),
        toml::Value::Integer(i) => Some(AttributeValue::Int(*i)),
        toml::Value::Boolean(b) => Some(AttributeValue::Bool(*b)),
        toml::Value::String(s) => Some(AttributeValue::Text(s.clone())),
        toml::Value::Array(arr) if arr.len() == 3 => {
            let mut out = [0.0f32; 3];
            for (slot, item) in out.iter_mut().zip(arr) {
                *slot = toml_f32(item)?;
            }
            Some(AttributeValue::Vec3(Vec3::from_array(out)))
        }
        _ => None,
    }
}

pub(crate) fn toml_f32(v: &toml::Value) -> Option<f32> {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
}
