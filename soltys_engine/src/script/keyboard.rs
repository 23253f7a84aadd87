use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use mlua::{Error as LuaError, Lua, MetaMethod, UserData, UserDataMethods, Value};

use super::DispatchError;
use crate::keyboard::KeyboardState;

#[derive(Clone)]
struct KeyboardBinding(Rc<RefCell<KeyboardState>>);

impl UserData for KeyboardBinding {
    fn add_methods<'lua, M: UserDataMethods<'lua, Self>>(methods: &mut M) {
        methods.add_method("IsKeyDown", |_, this, key: Value| {
            let keyboard = this.0.borrow();
            let down = match key {
                Value::Integer(vkey) => keyboard.is_key_down(vkey as u32),
                Value::Number(vkey) => keyboard.is_key_down(vkey as u32),
                Value::String(text) => text
                    .to_str()?
                    .chars()
                    .next()
                    .map(|ch| keyboard.is_char_down(ch))
                    .unwrap_or(false),
                _ => {
                    return Err(LuaError::external(DispatchError::BadArgument {
                        object: "Keyboard",
                        method: "IsKeyDown",
                        expected: "virtual-key number or single-character string",
                    }));
                }
            };
            Ok(down)
        });

        methods.add_meta_method(MetaMethod::Index, |lua, this, name: String| {
            let keyboard = this.0.borrow();
            let value = match name.as_str() {
                "Type" => Value::String(lua.create_string("keyboard")?),
                "Key" => match keyboard.current_key() {
                    Some(ch) => Value::String(lua.create_string(ch.to_string())?),
                    None => Value::Nil,
                },
                "Printable" => Value::Boolean(keyboard.printable()),
                "KeyCode" => Value::Integer(i64::from(keyboard.char_code())),
                "IsShift" => Value::Boolean(keyboard.is_shift_down()),
                "IsAlt" => Value::Boolean(keyboard.is_alt_down()),
                "IsControl" => Value::Boolean(keyboard.is_control_down()),
                other => {
                    return Err(LuaError::external(DispatchError::UnknownProperty {
                        object: "Keyboard",
                        property: other.to_string(),
                    }));
                }
            };
            Ok(value)
        });
    }
}

/// Installs the `Keyboard` global over the shared keyboard state.
pub(crate) fn install(lua: &Lua, keyboard: Rc<RefCell<KeyboardState>>) -> Result<()> {
    lua.globals().set("Keyboard", KeyboardBinding(keyboard))?;
    Ok(())
}
