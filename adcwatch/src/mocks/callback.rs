use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::callback::Callback;
use crate::errors::CallbackError;

#[derive(Debug, Default)]
struct MockCallbackState {
    invocations: Vec<(i32, i32, i32)>,
    fail: bool,
}

/// Recording stand-in for the external program. Clones share the recorded
/// state, so tests can keep one while the monitor owns another.
#[derive(Debug, Clone, Default)]
pub struct MockCallback {
    state: Arc<Mutex<MockCallbackState>>,
}

impl MockCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(value, min, max)` triple this callback was invoked with, in
    /// order, including invocations scripted to fail.
    pub fn invocations(&self) -> Vec<(i32, i32, i32)> {
        self.state.lock().invocations.clone()
    }

    /// Makes subsequent invocations report a launch failure.
    pub fn fail(&self, fail: bool) {
        self.state.lock().fail = fail;
    }
}

impl Callback for MockCallback {
    fn notify(&mut self, value: i32, min: i32, max: i32) -> Result<(), CallbackError> {
        let mut state = self.state.lock();
        state.invocations.push((value, min, max));
        if state.fail {
            return Err(CallbackError::SpawnFailed {
                program: "mock".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted failure"),
            });
        }
        Ok(())
    }
}
