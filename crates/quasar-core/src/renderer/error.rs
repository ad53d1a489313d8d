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

//! Defines the error types of the rendering subsystem.

use crate::stage::StageError;

/// An error reported by a graphics backend while executing a command.
#[derive(Debug, thiserror::Error)]
#[error("backend error: {message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    /// Creates a backend error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message describing the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error raised while draining a command processor.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The backend rejected the command at `index` of the drained batch.
    #[error("render command #{index} failed")]
    Backend {
        /// Position of the failing command within the drained batch.
        index: usize,
        /// The backend's error.
        #[source]
        source: BackendError,
    },
}

impl From<CommandError> for StageError {
    fn from(error: CommandError) -> Self {
        StageError::ExecutionFailed(Box::new(error))
    }
}
