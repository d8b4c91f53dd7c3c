// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Errors of the rendering subsystem.
//!
//! Resource creation reports a [`ResourceError`]; render systems wrap it into
//! a [`RenderError`] naming what they were building.

use std::fmt;

/// A shader program could not be built.
#[derive(Debug)]
pub enum ShaderError {
    /// A stage failed to compile, or the stages failed to link.
    CompilationError {
        /// The label of the program.
        label: String,
        /// The compiler or linker log.
        details: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationError { label, details } => {
                write!(f, "program '{label}' did not build: {details}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// A GPU resource could not be created or used.
#[derive(Debug)]
pub enum ResourceError {
    /// The shader program failed to build.
    Shader(ShaderError),
    /// The framebuffer attachments do not form a complete render target.
    IncompleteFramebuffer {
        /// The label of the framebuffer.
        label: String,
    },
    /// The framebuffer has nothing attached at the requested point.
    MissingAttachment,
    /// The handle was never created, or was already released.
    InvalidHandle,
    /// The device refused the operation for the given resource state.
    InvalidOperation(String),
    /// A mapped access or bound range reaches past the end of the resource.
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => err.fmt(f),
            ResourceError::IncompleteFramebuffer { label } => write!(f, "framebuffer '{label}' is incomplete"),
            ResourceError::MissingAttachment => f.write_str("no texture at this framebuffer attachment"),
            ResourceError::InvalidHandle => f.write_str("stale or unknown resource handle"),
            ResourceError::InvalidOperation(msg) => f.write_str(msg),
            ResourceError::OutOfBounds => f.write_str("access outside of the resource"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let ResourceError::Shader(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// Creating or configuring a render system failed.
#[derive(Debug)]
pub enum RenderError {
    /// A GPU resource the render system needs could not be created.
    ResourceCreation {
        /// Short name of the resource, e.g. "gbuffer".
        what: String,
        /// Why the device refused it.
        source: ResourceError,
    },
    /// An optional pipeline step could not be set up.
    StepInitialization(String),
    /// The configuration asks for something this render system does not implement.
    UnsupportedConfiguration(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ResourceCreation { what, source } => write!(f, "creating the {what} failed: {source}"),
            RenderError::StepInitialization(msg) => write!(f, "render step setup failed: {msg}"),
            RenderError::UnsupportedConfiguration(msg) => write!(f, "unsupported configuration: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceCreation { source, .. } => Some(source),
            RenderError::StepInitialization(_) | RenderError::UnsupportedConfiguration(_) => None,
        }
    }
}

impl RenderError {
    /// Wraps a [`ResourceError`] with the name of the resource that failed.
    pub fn creation(what: impl Into<String>, source: ResourceError) -> Self {
        RenderError::ResourceCreation {
            what: what.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn creation_error_chains_to_the_shader_log() {
        let err = RenderError::creation(
            "lighting pass program",
            ShaderError::CompilationError {
                label: "Lighting Pass".into(),
                details: "syntax error".into(),
            }
            .into(),
        );
        assert_eq!(
            err.to_string(),
            "creating the lighting pass program failed: program 'Lighting Pass' did not build: syntax error"
        );
        let resource = err.source().unwrap();
        assert!(resource.source().is_some());
    }
}
