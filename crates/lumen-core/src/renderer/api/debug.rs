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

//! Diagnostics reported by the graphics driver.
//!
//! A device forwards every driver message to the callback installed with
//! [`GraphicsDevice::set_debug_callback`]. [`log_debug_message`] is the default
//! sink and routes messages into the `log` facade.
//!
//! [`GraphicsDevice::set_debug_callback`]: crate::renderer::GraphicsDevice::set_debug_callback

use std::fmt;

/// The component that produced a debug message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugSource {
    /// The graphics API itself.
    Api,
    /// The window system binding.
    WindowSystem,
    /// The shader compiler.
    ShaderCompiler,
    /// A third-party tool.
    ThirdParty,
    /// The application.
    Application,
    /// Anything else.
    Other,
}

impl DebugSource {
    /// Returns a display name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DebugSource::Api => "API",
            DebugSource::WindowSystem => "Window system",
            DebugSource::ShaderCompiler => "Shader compiler",
            DebugSource::ThirdParty => "Third party",
            DebugSource::Application => "Application",
            DebugSource::Other => "Other",
        }
    }
}

/// What a debug message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugCategory {
    /// An API error.
    Error,
    /// Use of deprecated behavior.
    DeprecatedBehavior,
    /// Use of undefined behavior.
    UndefinedBehavior,
    /// A portability concern.
    Portability,
    /// A performance concern.
    Performance,
    /// A stream annotation.
    Marker,
    /// Anything else.
    Other,
}

impl DebugCategory {
    /// Returns a display name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DebugCategory::Error => "Error",
            DebugCategory::DeprecatedBehavior => "Deprecated behavior",
            DebugCategory::UndefinedBehavior => "Undefined behavior",
            DebugCategory::Portability => "Portability issue",
            DebugCategory::Performance => "Performance issue",
            DebugCategory::Marker => "Stream annotation",
            DebugCategory::Other => "Other",
        }
    }
}

/// The severity of a debug message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DebugSeverity {
    /// Informational.
    Notification,
    /// Minor issue.
    Low,
    /// Significant issue.
    Medium,
    /// Error or undefined behavior.
    High,
}

impl DebugSeverity {
    /// Returns a display name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DebugSeverity::Notification => "Notification",
            DebugSeverity::Low => "Low",
            DebugSeverity::Medium => "Medium",
            DebugSeverity::High => "High",
        }
    }

    /// The `log` level messages of this severity are emitted at.
    pub const fn log_level(&self) -> log::Level {
        match self {
            DebugSeverity::High => log::Level::Error,
            DebugSeverity::Medium => log::Level::Warn,
            DebugSeverity::Low => log::Level::Info,
            DebugSeverity::Notification => log::Level::Debug,
        }
    }
}

/// A single message from the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugMessage {
    /// Who produced the message.
    pub source: DebugSource,
    /// What the message is about.
    pub category: DebugCategory,
    /// How severe it is.
    pub severity: DebugSeverity,
    /// The message text.
    pub message: String,
}

impl fmt::Display for DebugMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.source.as_str(),
            self.category.as_str(),
            self.severity.as_str(),
            self.message
        )
    }
}

/// A sink for driver messages.
pub type DebugCallback = Box<dyn Fn(&DebugMessage) + Send + Sync>;

/// Writes `message` to the `log` facade at the level matching its severity.
pub fn log_debug_message(message: &DebugMessage) {
    log::log!(target: "lumen::gpu", message.severity.log_level(), "{message}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_display_names_all_parts() {
        let message = DebugMessage {
            source: DebugSource::ShaderCompiler,
            category: DebugCategory::Performance,
            severity: DebugSeverity::Medium,
            message: "recompiled".to_string(),
        };
        assert_eq!(
            message.to_string(),
            "[Shader compiler] Performance issue (Medium): recompiled"
        );
    }

    #[test]
    fn severity_maps_to_log_levels() {
        assert_eq!(DebugSeverity::High.log_level(), log::Level::Error);
        assert_eq!(DebugSeverity::Notification.log_level(), log::Level::Debug);
        assert!(DebugSeverity::High > DebugSeverity::Low);
    }
}
