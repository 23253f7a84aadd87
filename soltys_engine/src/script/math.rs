use anyhow::Result;
use mlua::Lua;

fn degree_to_radian(value: f64) -> f64 {
    value * (std::f64::consts::PI / 180.0)
}

fn radian_to_degree(value: f64) -> f64 {
    value * (180.0 / std::f64::consts::PI)
}

/// Installs the `Math` host table. The trigonometric and hyperbolic calls
/// take degrees, matching the scripts these games shipped with.
pub(crate) fn install(lua: &Lua) -> Result<()> {
    let math = lua.create_table()?;
    math.set("Type", "math")?;
    math.set("PI", std::f64::consts::PI)?;

    math.set("Abs", lua.create_function(|_, value: f64| Ok(value.abs()))?)?;
    math.set("Acos", lua.create_function(|_, value: f64| Ok(value.acos()))?)?;
    math.set("Asin", lua.create_function(|_, value: f64| Ok(value.asin()))?)?;
    math.set("Atan", lua.create_function(|_, value: f64| Ok(value.atan()))?)?;
    math.set(
        "Atan2",
        lua.create_function(|_, (y, x): (f64, f64)| Ok(y.atan2(x)))?,
    )?;
    math.set("Ceil", lua.create_function(|_, value: f64| Ok(value.ceil()))?)?;
    math.set(
        "Cos",
        lua.create_function(|_, value: f64| Ok(degree_to_radian(value).cos()))?,
    )?;
    math.set(
        "Cosh",
        lua.create_function(|_, value: f64| Ok(degree_to_radian(value).cosh()))?,
    )?;
    math.set("Exp", lua.create_function(|_, value: f64| Ok(value.exp()))?)?;
    math.set(
        "Floor",
        lua.create_function(|_, value: f64| Ok(value.floor()))?,
    )?;
    math.set("Log", lua.create_function(|_, value: f64| Ok(value.ln()))?)?;
    math.set(
        "Log10",
        lua.create_function(|_, value: f64| Ok(value.log10()))?,
    )?;
    math.set(
        "Pow",
        lua.create_function(|_, (x, y): (f64, f64)| Ok(x.powf(y)))?,
    )?;
    math.set(
        "Sin",
        lua.create_function(|_, value: f64| Ok(degree_to_radian(value).sin()))?,
    )?;
    math.set(
        "Sinh",
        lua.create_function(|_, value: f64| Ok(degree_to_radian(value).sinh()))?,
    )?;
    math.set("Sqrt", lua.create_function(|_, value: f64| Ok(value.sqrt()))?)?;
    math.set(
        "Tan",
        lua.create_function(|_, value: f64| Ok(degree_to_radian(value).tan()))?,
    )?;
    math.set(
        "Tanh",
        lua.create_function(|_, value: f64| Ok(degree_to_radian(value).tanh()))?,
    )?;
    math.set(
        "DegToRad",
        lua.create_function(|_, value: f64| Ok(degree_to_radian(value)))?,
    )?;
    math.set(
        "RadToDeg",
        lua.create_function(|_, value: f64| Ok(radian_to_degree(value)))?,
    )?;

    lua.globals().set("Math", math)?;
    Ok(())
}
