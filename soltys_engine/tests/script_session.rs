use anyhow::Result;
use soltys_engine::keyboard::Modifiers;
use soltys_engine::keys::KeyCode;
use soltys_engine::script::ScriptSession;

fn eval_number(session: &ScriptSession, expr: &str) -> f64 {
    session
        .eval(expr)
        .unwrap()
        .parse()
        .unwrap_or_else(|_| panic!("{expr} did not evaluate to a number"))
}

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn math_trig_takes_degrees() -> Result<()> {
    let session = ScriptSession::new()?;

    assert!(approx(eval_number(&session, "Math.Cos(60)"), 0.5));
    assert!(approx(eval_number(&session, "Math.Sin(90)"), 1.0));
    assert!(approx(eval_number(&session, "Math.Tan(45)"), 1.0));
    Ok(())
}

#[test]
fn math_argument_order_matches_the_scripts() -> Result<()> {
    let session = ScriptSession::new()?;

    // Atan2 takes (y, x); Pow takes (base, exponent).
    assert!(approx(
        eval_number(&session, "Math.Atan2(1, 0)"),
        std::f64::consts::FRAC_PI_2
    ));
    assert!(approx(eval_number(&session, "Math.Pow(2, 10)"), 1024.0));
    Ok(())
}

#[test]
fn math_helpers_and_constants() -> Result<()> {
    let session = ScriptSession::new()?;

    assert!(approx(eval_number(&session, "Math.Sqrt(81)"), 9.0));
    assert!(approx(eval_number(&session, "Math.Floor(3.9)"), 3.0));
    assert!(approx(eval_number(&session, "Math.Ceil(3.1)"), 4.0));
    assert!(approx(eval_number(&session, "Math.Abs(-12.5)"), 12.5));
    assert!(approx(
        eval_number(&session, "Math.DegToRad(180)"),
        std::f64::consts::PI
    ));
    assert!(approx(
        eval_number(&session, "Math.RadToDeg(Math.PI)"),
        180.0
    ));
    assert_eq!(session.eval("Math.Type")?, "math");
    Ok(())
}

#[test]
fn math_results_feed_back_into_scripts() -> Result<()> {
    let session = ScriptSession::new()?;

    session.exec("total = 0\nfor i = 1, 4 do total = total + Math.Pow(2, i) end")?;
    assert!(approx(eval_number(&session, "total"), 30.0));
    Ok(())
}

#[test]
fn keyboard_object_tracks_presses() -> Result<()> {
    let session = ScriptSession::new()?;

    session
        .keyboard()
        .borrow_mut()
        .handle_key_press(KeyCode::A, Modifiers::default());

    assert_eq!(session.eval("Keyboard:IsKeyDown(65)")?, "true");
    assert_eq!(session.eval("Keyboard:IsKeyDown('a')")?, "true");
    assert_eq!(session.eval("Keyboard:IsKeyDown('A')")?, "true");
    assert_eq!(session.eval("Keyboard:IsKeyDown(66)")?, "false");

    session.keyboard().borrow_mut().handle_key_release(KeyCode::A);
    assert_eq!(session.eval("Keyboard:IsKeyDown(65)")?, "false");
    Ok(())
}

#[test]
fn keyboard_properties_mirror_the_last_event() -> Result<()> {
    let session = ScriptSession::new()?;

    session.keyboard().borrow_mut().handle_key_press(
        KeyCode::B,
        Modifiers {
            shift: true,
            ..Modifiers::default()
        },
    );

    assert_eq!(session.eval("Keyboard.Key")?, "B");
    assert_eq!(session.eval("Keyboard.Printable")?, "true");
    assert_eq!(session.eval("Keyboard.KeyCode")?, "66");
    assert_eq!(session.eval("Keyboard.IsShift")?, "true");
    assert_eq!(session.eval("Keyboard.IsAlt")?, "false");
    assert_eq!(session.eval("Keyboard.Type")?, "keyboard");
    Ok(())
}

#[test]
fn unknown_keyboard_property_is_a_dispatch_error() -> Result<()> {
    let session = ScriptSession::new()?;

    let err = session.eval("Keyboard.Bogus").unwrap_err();
    assert!(format!("{err:#}").contains("no property Bogus"));
    Ok(())
}

#[test]
fn bad_is_key_down_argument_is_a_dispatch_error() -> Result<()> {
    let session = ScriptSession::new()?;

    assert!(session.eval("Keyboard:IsKeyDown({})").is_err());
    Ok(())
}
