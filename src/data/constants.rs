//! Constants and mapping tables for LaTeX expression evaluation
//!
//! Static tables consulted by the numeric interpreter:
//! - Named constants reachable from expression text
//! - Unary function commands (`\sin`, `\ln`, ...)
//! - Command-to-operator rewrites (`\cdot`, `\times`, ...)
//! - Commands ignored as pure spacing/styling

use phf::phf_map;

/// Named constants. `\pi` is rewritten to the `PI` placeholder before
/// parsing, so both the command and the placeholder resolve here.
pub static CONSTANTS: phf::Map<&'static str, f64> = phf_map! {
    "PI" => std::f64::consts::PI,
    "E" => std::f64::consts::E,
};

/// Constant-valued commands (command name without backslash)
pub static CONSTANT_COMMANDS: phf::Map<&'static str, &'static str> = phf_map! {
    "pi" => "PI",
    "tau" => "TAU",
};

/// Extra constants only reachable through commands
pub static COMMAND_CONSTANTS: phf::Map<&'static str, f64> = phf_map! {
    "TAU" => std::f64::consts::TAU,
};

/// Commands that rewrite to a binary operator
pub static OPERATOR_COMMANDS: phf::Map<&'static str, char> = phf_map! {
    "cdot" => '*',
    "times" => '*',
    "div" => '/',
    "ast" => '*',
};

/// Spacing and styling commands with no numeric meaning
pub static IGNORED_COMMANDS: phf::Map<&'static str, bool> = phf_map! {
    "," => true,
    ";" => true,
    ":" => true,
    "!" => true,
    " " => true,
    "quad" => true,
    "qquad" => true,
    "thinspace" => true,
    "displaystyle" => true,
    "textstyle" => true,
    "limits" => true,
    "nolimits" => true,
};

/// Commands whose curly argument is evaluated transparently (the wrapper
/// only affects typesetting)
pub static TRANSPARENT_COMMANDS: phf::Map<&'static str, bool> = phf_map! {
    "mathrm" => true,
    "mathit" => true,
    "mathbf" => true,
    "boldsymbol" => true,
    "text" => true,
    "textrm" => true,
    "color" => false,
    "textcolor" => false,
};

type UnaryFn = fn(f64) -> f64;

fn f_sin(x: f64) -> f64 {
    x.sin()
}
fn f_cos(x: f64) -> f64 {
    x.cos()
}
fn f_tan(x: f64) -> f64 {
    x.tan()
}
fn f_asin(x: f64) -> f64 {
    x.asin()
}
fn f_acos(x: f64) -> f64 {
    x.acos()
}
fn f_atan(x: f64) -> f64 {
    x.atan()
}
fn f_sinh(x: f64) -> f64 {
    x.sinh()
}
fn f_cosh(x: f64) -> f64 {
    x.cosh()
}
fn f_tanh(x: f64) -> f64 {
    x.tanh()
}
fn f_ln(x: f64) -> f64 {
    x.ln()
}
fn f_log(x: f64) -> f64 {
    x.log10()
}
fn f_exp(x: f64) -> f64 {
    x.exp()
}
fn f_sqrt(x: f64) -> f64 {
    x.sqrt()
}

/// Unary function commands (command name without backslash)
pub static UNARY_FUNCTIONS: phf::Map<&'static str, UnaryFn> = phf_map! {
    "sin" => f_sin,
    "cos" => f_cos,
    "tan" => f_tan,
    "arcsin" => f_asin,
    "arccos" => f_acos,
    "arctan" => f_atan,
    "sinh" => f_sinh,
    "cosh" => f_cosh,
    "tanh" => f_tanh,
    "ln" => f_ln,
    "log" => f_log,
    "exp" => f_exp,
    "sqrt" => f_sqrt,
};
