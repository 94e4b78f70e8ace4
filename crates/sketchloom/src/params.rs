//! Parameter sets: named knobs with declared ranges.
//!
//! Each sketch keeps its parameters in a plain serde struct. On top of
//! that, [`ParameterSet`] gives controllers (the TUI, `--set name=value` on
//! the CLI) a dynamic, name-based view: a static table of [`ParamSpec`]s
//! plus `get`/`set` by name.
//!
//! Ranges and steps are metadata for the controller. The generators do not
//! enforce them; they clamp only what would break the math (point counts,
//! cycle counts) at the point of use.

use std::fmt;

use crate::error::{Result, SketchError};

/// What kind of control a parameter is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// A slider: `[min, max]` moved in increments of `step`.
    Number { min: f64, max: f64, step: f64 },
    /// A checkbox.
    Toggle,
    /// A drop-down with the given option labels.
    Choice(&'static [&'static str]),
}

/// Declaration of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Field name, as used in configs and `--set`
    pub name: &'static str,
    /// Human readable label
    pub label: &'static str,
    pub kind: ParamKind,
}

/// A parameter value crossing the dynamic interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Toggle(bool),
    /// Index into the option labels
    Choice(usize),
}

/// Name-based access to a sketch's parameters.
///
/// Implemented for every `*Params` struct through the `parameter_set!`
/// macro, which maps each field name to the field.
pub trait ParameterSet {
    /// Name of the sketch these parameters belong to.
    fn sketch_name(&self) -> &'static str;

    /// Declared controls, in display order.
    fn specs(&self) -> &'static [ParamSpec];

    fn get(&self, name: &str) -> Option<ParamValue>;

    fn set(&mut self, name: &str, value: ParamValue) -> Result<()>;

    fn spec(&self, name: &str) -> Option<&'static ParamSpec> {
        self.specs().iter().find(|spec| spec.name == name)
    }

    /// Move a parameter by `steps` increments, clamped to its range.
    ///
    /// Toggles flip on any non-zero step; choices cycle.
    fn nudge(&mut self, name: &str, steps: i32) -> Result<ParamValue> {
        let unknown = || SketchError::UnknownParameter {
            sketch: self.sketch_name(),
            name: name.to_string(),
        };
        let spec = self.spec(name).ok_or_else(unknown)?;
        let current = self.get(name).ok_or_else(unknown)?;
        let next = spec.nudged(current, steps);
        self.set(name, next)?;
        Ok(next)
    }

    /// Parse `raw` according to the parameter's kind and assign it.
    fn set_from_str(&mut self, name: &str, raw: &str) -> Result<()> {
        let spec = self.spec(name).ok_or_else(|| SketchError::UnknownParameter {
            sketch: self.sketch_name(),
            name: name.to_string(),
        })?;
        let value = spec.parse(raw)?;
        self.set(name, value)
    }
}

impl ParamSpec {
    pub const fn number(name: &'static str, label: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self { name, label, kind: ParamKind::Number { min, max, step } }
    }

    pub const fn toggle(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: ParamKind::Toggle }
    }

    pub const fn choice(name: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self { name, label, kind: ParamKind::Choice(options) }
    }

    /// The value `steps` increments away from `current`.
    pub fn nudged(&self, current: ParamValue, steps: i32) -> ParamValue {
        match (self.kind, current) {
            (ParamKind::Number { min, max, step }, ParamValue::Number(v)) => {
                let next = (v + step * steps as f64).clamp(min, max);
                // Keep repeated nudges from accumulating float noise
                ParamValue::Number((next * 1e9).round() / 1e9)
            }
            (ParamKind::Toggle, ParamValue::Toggle(on)) => ParamValue::Toggle(if steps == 0 { on } else { !on }),
            (ParamKind::Choice(options), ParamValue::Choice(index)) if !options.is_empty() => {
                let len = options.len() as i64;
                ParamValue::Choice((index as i64 + steps as i64).rem_euclid(len) as usize)
            }
            _ => current,
        }
    }

    /// Parse a value from text: numbers, `true/false/on/off/yes/no/1/0`
    /// for toggles, and option labels (or indices) for choices.
    pub fn parse(&self, raw: &str) -> Result<ParamValue> {
        let raw = raw.trim();
        let invalid = |reason: String| SketchError::InvalidParameterValue {
            name: self.name.to_string(),
            reason,
        };

        match self.kind {
            ParamKind::Number { .. } => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParamValue::Number)
                .ok_or_else(|| invalid(format!("'{}' is not a number", raw))),
            ParamKind::Toggle => match raw.to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(ParamValue::Toggle(true)),
                "false" | "off" | "no" | "0" => Ok(ParamValue::Toggle(false)),
                other => Err(invalid(format!("'{}' is not on/off", other))),
            },
            ParamKind::Choice(options) => {
                // Labels match as shown or in their snake_case config form
                let matches = |option: &str| {
                    option.eq_ignore_ascii_case(raw) || option.replace(' ', "_").eq_ignore_ascii_case(raw)
                };
                if let Some(index) = options.iter().position(|o| matches(o)) {
                    return Ok(ParamValue::Choice(index));
                }
                match raw.parse::<usize>() {
                    Ok(index) if index < options.len() => Ok(ParamValue::Choice(index)),
                    _ => Err(invalid(format!("expected one of: {}", options.join(", ")))),
                }
            }
        }
    }

    /// Display a value using this spec's labels.
    pub fn format(&self, value: ParamValue) -> String {
        match (self.kind, value) {
            (ParamKind::Choice(options), ParamValue::Choice(index)) => {
                options.get(index).map(|s| s.to_string()).unwrap_or_else(|| index.to_string())
            }
            (ParamKind::Number { step, .. }, ParamValue::Number(v)) => {
                format!("{:.*}", decimals_for_step(step), v)
            }
            _ => value.to_string(),
        }
    }

    /// Short description of the valid range, e.g. `0..5000 step 100`.
    pub fn range_label(&self) -> String {
        match self.kind {
            ParamKind::Number { min, max, step } => format!("{}..{} step {}", min, max, step),
            ParamKind::Toggle => "on|off".to_string(),
            ParamKind::Choice(options) => options.join("|"),
        }
    }
}

fn decimals_for_step(step: f64) -> usize {
    let mut decimals = 0;
    let mut scaled = step.abs();
    while decimals < 6 && scaled > 0.0 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Number(v) => v,
            ParamValue::Toggle(on) => if on { 1.0 } else { 0.0 },
            ParamValue::Choice(index) => index as f64,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Toggle(on) => write!(f, "{}", if *on { "on" } else { "off" }),
            ParamValue::Choice(index) => write!(f, "#{}", index),
        }
    }
}

/// Conversion between a struct field and a [`ParamValue`].
pub trait ParamField {
    fn to_value(&self) -> ParamValue;
    fn assign(&mut self, name: &str, value: ParamValue) -> Result<()>;
}

fn mismatch(name: &str, expected: &str, value: ParamValue) -> SketchError {
    SketchError::InvalidParameterValue {
        name: name.to_string(),
        reason: format!("expected {}, got {:?}", expected, value),
    }
}

impl ParamField for f64 {
    fn to_value(&self) -> ParamValue {
        ParamValue::Number(*self)
    }

    fn assign(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match value {
            ParamValue::Number(v) if v.is_finite() => {
                *self = v;
                Ok(())
            }
            other => Err(mismatch(name, "a finite number", other)),
        }
    }
}

impl ParamField for usize {
    fn to_value(&self) -> ParamValue {
        ParamValue::Number(*self as f64)
    }

    fn assign(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match value {
            ParamValue::Number(v) if v.is_finite() => {
                *self = v.round().max(0.0) as usize;
                Ok(())
            }
            other => Err(mismatch(name, "a count", other)),
        }
    }
}

impl ParamField for i32 {
    fn to_value(&self) -> ParamValue {
        ParamValue::Number(*self as f64)
    }

    fn assign(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match value {
            ParamValue::Number(v) if v.is_finite() => {
                *self = v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
                Ok(())
            }
            other => Err(mismatch(name, "an integer", other)),
        }
    }
}

impl ParamField for bool {
    fn to_value(&self) -> ParamValue {
        ParamValue::Toggle(*self)
    }

    fn assign(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match value {
            ParamValue::Toggle(on) => {
                *self = on;
                Ok(())
            }
            ParamValue::Number(v) => {
                *self = v != 0.0;
                Ok(())
            }
            other => Err(mismatch(name, "on/off", other)),
        }
    }
}

/// Implement [`ParamField`] for a fieldless enum used as a choice.
/// Variants are listed in option-label order.
macro_rules! choice_field {
    ($ty:ty, [$($variant:path),+ $(,)?]) => {
        impl $crate::params::ParamField for $ty {
            fn to_value(&self) -> $crate::params::ParamValue {
                let variants = [$($variant),+];
                let index = variants.iter().position(|v| v == self).unwrap_or(0);
                $crate::params::ParamValue::Choice(index)
            }

            fn assign(&mut self, name: &str, value: $crate::params::ParamValue) -> $crate::error::Result<()> {
                let variants = [$($variant),+];
                let index = match value {
                    $crate::params::ParamValue::Choice(index) => Some(index),
                    $crate::params::ParamValue::Number(v) if v >= 0.0 => Some(v.round() as usize),
                    _ => None,
                };
                match index.and_then(|i| variants.get(i)) {
                    Some(variant) => {
                        *self = *variant;
                        Ok(())
                    }
                    None => Err($crate::error::SketchError::InvalidParameterValue {
                        name: name.to_string(),
                        reason: format!("no option for {:?}", value),
                    }),
                }
            }
        }
    };
}

/// Implement [`ParameterSet`] for a params struct by listing its fields.
/// Every name in the `ParamSpec` table must appear in the field list.
macro_rules! parameter_set {
    ($ty:ty, $sketch:literal, $specs:expr, [$($field:ident),+ $(,)?]) => {
        impl $crate::params::ParameterSet for $ty {
            fn sketch_name(&self) -> &'static str {
                $sketch
            }

            fn specs(&self) -> &'static [$crate::params::ParamSpec] {
                $specs
            }

            fn get(&self, name: &str) -> Option<$crate::params::ParamValue> {
                match name {
                    $(stringify!($field) => Some($crate::params::ParamField::to_value(&self.$field)),)+
                    _ => None,
                }
            }

            fn set(&mut self, name: &str, value: $crate::params::ParamValue) -> $crate::error::Result<()> {
                match name {
                    $(stringify!($field) => $crate::params::ParamField::assign(&mut self.$field, name, value),)+
                    _ => Err($crate::error::SketchError::UnknownParameter {
                        sketch: $sketch,
                        name: name.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use choice_field;
pub(crate) use parameter_set;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Curve,
        Lines,
    }

    choice_field!(Mode, [Mode::Curve, Mode::Lines]);

    struct Knobs {
        speed: f64,
        count: usize,
        offset: i32,
        enabled: bool,
        mode: Mode,
    }

    const KNOBS: &[ParamSpec] = &[
        ParamSpec::number("speed", "Speed", 0.0, 1.0, 0.01),
        ParamSpec::number("count", "Count", 100.0, 5000.0, 100.0),
        ParamSpec::number("offset", "Offset", -5.0, 5.0, 1.0),
        ParamSpec::toggle("enabled", "Enabled"),
        ParamSpec::choice("mode", "Mode", &["Curve", "Lines"]),
    ];

    parameter_set!(Knobs, "knobs", KNOBS, [speed, count, offset, enabled, mode]);

    fn knobs() -> Knobs {
        Knobs { speed: 0.5, count: 2000, offset: 0, enabled: false, mode: Mode::Curve }
    }

    #[test]
    fn every_spec_is_readable() {
        let k = knobs();
        for spec in k.specs() {
            assert!(k.get(spec.name).is_some(), "missing field for {}", spec.name);
        }
    }

    #[test]
    fn nudge_clamps_to_range() {
        let mut k = knobs();
        assert_eq!(k.nudge("count", 40).unwrap(), ParamValue::Number(5000.0));
        assert_eq!(k.count, 5000);
        assert_eq!(k.nudge("count", -100).unwrap(), ParamValue::Number(100.0));
        k.nudge("speed", 3).unwrap();
        assert!((k.speed - 0.53).abs() < 1e-12);
    }

    #[test]
    fn nudge_flips_toggles_and_cycles_choices() {
        let mut k = knobs();
        k.nudge("enabled", 1).unwrap();
        assert!(k.enabled);
        k.nudge("mode", 1).unwrap();
        assert_eq!(k.mode, Mode::Lines);
        k.nudge("mode", 1).unwrap();
        assert_eq!(k.mode, Mode::Curve);
        k.nudge("mode", -1).unwrap();
        assert_eq!(k.mode, Mode::Lines);
    }

    #[test]
    fn set_from_str_parses_by_kind() {
        let mut k = knobs();
        k.set_from_str("offset", "-3").unwrap();
        assert_eq!(k.offset, -3);
        k.set_from_str("enabled", "on").unwrap();
        assert!(k.enabled);
        k.set_from_str("mode", "lines").unwrap();
        assert_eq!(k.mode, Mode::Lines);
        assert!(k.set_from_str("speed", "fast").is_err());
        assert!(matches!(
            k.set_from_str("nope", "1"),
            Err(SketchError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn choices_parse_in_config_form() {
        let spec = ParamSpec::choice("draw_mode", "Draw Mode", &["Curve", "Perpendicular Lines"]);
        assert_eq!(spec.parse("perpendicular_lines").unwrap(), ParamValue::Choice(1));
        assert_eq!(spec.parse("Perpendicular Lines").unwrap(), ParamValue::Choice(1));
        assert!(spec.parse("perpendicular").is_err());
    }

    #[test]
    fn format_uses_labels_and_step_precision() {
        let k = knobs();
        let mode = k.spec("mode").unwrap();
        assert_eq!(mode.format(ParamValue::Choice(1)), "Lines");
        let speed = k.spec("speed").unwrap();
        assert_eq!(speed.format(ParamValue::Number(0.5)), "0.50");
    }
}
