mod keyboard;
mod math;

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use mlua::{Lua, LuaOptions, StdLib, Value};
use thiserror::Error;

use crate::keyboard::KeyboardState;

/// Dispatch failures surfaced to scripts when they poke a host object the
/// wrong way.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{object} has no property {property}")]
    UnknownProperty {
        object: &'static str,
        property: String,
    },
    #[error("{object}.{method} expects a {expected}")]
    BadArgument {
        object: &'static str,
        method: &'static str,
        expected: &'static str,
    },
}

/// One embedded script session with the host extensions installed: the
/// `Math` table and the `Keyboard` state object.
pub struct ScriptSession {
    lua: Lua,
    keyboard: Rc<RefCell<KeyboardState>>,
}

impl ScriptSession {
    pub fn new() -> Result<Self> {
        let lua = Lua::new_with(StdLib::ALL_SAFE, LuaOptions::default())
            .context("initialising Lua runtime with standard libraries")?;
        let keyboard = Rc::new(RefCell::new(KeyboardState::new()));

        math::install(&lua).context("installing the Math extension")?;
        keyboard::install(&lua, keyboard.clone()).context("installing the Keyboard object")?;

        Ok(ScriptSession { lua, keyboard })
    }

    /// Shared handle the host uses to feed key events between script calls.
    pub fn keyboard(&self) -> Rc<RefCell<KeyboardState>> {
        self.keyboard.clone()
    }

    pub fn exec(&self, chunk: &str) -> Result<()> {
        self.lua
            .load(chunk)
            .exec()
            .context("executing script chunk")
    }

    pub fn exec_file(&self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        self.lua
            .load(&source)
            .set_name(path.to_string_lossy())
            .exec()
            .with_context(|| format!("running script {}", path.display()))
    }

    /// Evaluates an expression and renders the result for the host.
    pub fn eval(&self, expr: &str) -> Result<String> {
        let value: Value = self
            .lua
            .load(expr)
            .eval()
            .with_context(|| format!("evaluating {expr}"))?;
        Ok(render_value(&value))
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(flag) => flag.to_string(),
        Value::Integer(number) => number.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.to_string_lossy().into_owned(),
        other => format!("<{}>", other.type_name()),
    }
}
