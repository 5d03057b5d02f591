// Dweve Crosscheck - Correctness and benchmark harness for concurrent programs
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A process runner that replays scripted outputs.

use crosscheck_core::{HarnessError, Invocation, ProcessRunner, RawOutput, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

/// One scripted process result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Captured output to return.
    pub raw: RawOutput,
    /// Text written to the path following `-o`, if any.
    pub state: Option<String>,
}

impl Response {
    /// A successful run printing `stdout`.
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            raw: RawOutput::success(stdout),
            state: None,
        }
    }

    /// A successful run writing `state` to its output file.
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            raw: RawOutput::success(String::new()),
            state: Some(state.into()),
        }
    }

    /// A run exiting with `code` and printing `stderr`.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            raw: RawOutput {
                stdout: String::new(),
                stderr: stderr.into(),
                exit_code: Some(code),
            },
            state: None,
        }
    }
}

type Responder = Box<dyn Fn(&Invocation) -> Response>;

/// Replays queued responses in order, then falls back to a responder
/// function if one is set. Every invocation is recorded.
#[derive(Default)]
pub struct ScriptedRunner {
    queue: RefCell<VecDeque<Response>>,
    responder: Option<Responder>,
    invocations: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    /// Creates a runner with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner that answers every invocation with `f`.
    pub fn from_fn(f: impl Fn(&Invocation) -> Response + 'static) -> Self {
        Self {
            responder: Some(Box::new(f)),
            ..Self::default()
        }
    }

    /// Creates a runner that prints `stdout` on every invocation.
    pub fn always(stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        Self::from_fn(move |_| Response::stdout(stdout.clone()))
    }

    /// Queues a response.
    pub fn push(self, response: Response) -> Self {
        self.queue.borrow_mut().push_back(response);
        self
    }

    /// Queues a successful run printing `stdout`.
    pub fn push_stdout(self, stdout: impl Into<String>) -> Self {
        self.push(Response::stdout(stdout))
    }

    /// Queues a successful run writing `state` to its output file.
    pub fn push_state(self, state: impl Into<String>) -> Self {
        self.push(Response::state(state))
    }

    /// Number of invocations so far.
    pub fn invocation_count(&self) -> usize {
        self.invocations.borrow().len()
    }

    /// Copies of every invocation so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Number of queued responses not yet used.
    pub fn remaining(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl fmt::Debug for ScriptedRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedRunner")
            .field("queued", &self.remaining())
            .field("responder", &self.responder.is_some())
            .field("invocations", &self.invocation_count())
            .finish()
    }
}

fn output_path(invocation: &Invocation) -> Option<&str> {
    let pos = invocation.args.iter().position(|a| a == "-o")?;
    invocation.args.get(pos + 1).map(String::as_str)
}

impl ProcessRunner for ScriptedRunner {
    fn invoke(&self, invocation: &Invocation) -> Result<RawOutput> {
        self.invocations.borrow_mut().push(invocation.clone());

        let queued = self.queue.borrow_mut().pop_front();
        let response = match (queued, &self.responder) {
            (Some(response), _) => response,
            (None, Some(responder)) => responder(invocation),
            (None, None) => {
                return Err(HarnessError::Spawn {
                    program: invocation.program.clone(),
                    message: "no scripted output left".to_string(),
                })
            }
        };

        if let (Some(state), Some(path)) = (&response.state, output_path(invocation)) {
            std::fs::write(path, state).map_err(|e| HarnessError::io_error(path, e))?;
        }
        Ok(response.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(args: &[&str]) -> Invocation {
        Invocation::new("prog", args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_queue_then_exhausted() {
        let runner = ScriptedRunner::new().push_stdout("one").push_stdout("two");
        assert_eq!(runner.invoke(&inv(&[])).unwrap().stdout, "one");
        assert_eq!(runner.invoke(&inv(&[])).unwrap().stdout, "two");
        assert!(runner.invoke(&inv(&[])).is_err());
        assert_eq!(runner.invocation_count(), 3);
    }

    #[test]
    fn test_responder_sees_arguments() {
        let runner = ScriptedRunner::from_fn(|inv| Response::stdout(inv.args.join(",")));
        assert_eq!(runner.invoke(&inv(&["a", "b"])).unwrap().stdout, "a,b");
    }

    #[test]
    fn test_state_written_to_output_path() {
        let dir = std::env::temp_dir().join(format!("crosscheck-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let out = dir.join("state.txt");
        let runner = ScriptedRunner::new().push_state("1\n0 1.5\n");
        runner
            .invoke(&inv(&["-i", "in", "-o", out.to_str().unwrap()]))
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "1\n0 1.5\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
