//! Shader uniform values
//!
//! Uniforms flow down the scene graph: each node hands its children the
//! uniforms it inherited, overridden key-by-key by its own.

use std::collections::BTreeMap;

use cgmath::Matrix4;

/// A single uniform value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4(Matrix4<f32>),
    /// Texture unit a sampler reads from
    Sampler(u32),
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(v)
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(v: Matrix4<f32>) -> Self {
        Self::Mat4(v)
    }
}

/// Named uniform values, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uniforms(BTreeMap<String, UniformValue>);

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add or replace a value
    pub fn with(mut self, name: &str, value: impl Into<UniformValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<UniformValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// These uniforms with every key of `own` replacing the inherited value
    pub fn overridden_by(&self, own: &Uniforms) -> Uniforms {
        if own.is_empty() {
            return self.clone();
        }
        let mut merged = self.clone();
        for (name, value) in &own.0 {
            merged.0.insert(name.clone(), *value);
        }
        merged
    }
}
